//! Device session behavior against a simulated MacroPad

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};

use macropad_client::prelude::*;
use macropad_frame::{FrameCodec, FramedDecoder};
use macropad_transport::mock::{MockPort, MockTransport, ReadStep};
use macropad_transport::TransportError;

type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Wire config the simulated device starts with
fn device_config() -> Value {
    json!({
        "settings": {},
        "mappings": {"1": ["KeyRelease"]},
        "button_names": {"0": "Vol+"}
    })
}

fn encode(reply: &Value) -> Vec<ReadStep> {
    serde_json::to_vec(reply)
        .ok()
        .and_then(|payload| FrameCodec::default().encode(&payload).ok())
        .map(|bytes| vec![ReadStep::Data(bytes)])
        .unwrap_or_default()
}

fn decode_command(frame: &[u8]) -> Option<Value> {
    let payload = FramedDecoder::new().feed(frame).ok()??;
    serde_json::from_slice(&payload).ok()
}

/// Answer each command the way the firmware does, with `reply_to` able to
/// override the reply for a given command type
fn simulate(device: &MockTransport, reply_to: impl Fn(&str, Value) -> Option<Value> + Send + 'static) {
    device.set_responder(move |frame| {
        let Some(command) = decode_command(frame) else {
            return Vec::new();
        };
        let kind = command.get("type").and_then(Value::as_str).unwrap_or_default().to_string();
        let mut header = json!({"version": 0x0001_0000});
        if let (Some(map), Some(id)) = (
            header.as_object_mut(),
            command.pointer("/header/correlationId").cloned(),
        ) {
            map.insert("correlationId".to_string(), id);
        }

        if let Some(reply) = reply_to(&kind, header.clone()) {
            return encode(&reply);
        }
        let reply = match kind.as_str() {
            "GetConfig" => json!({"Config": {"header": header, "config": device_config()}}),
            _ => json!({"Ack": {"header": header, "message": format!("{kind} ok"), "success": true}}),
        };
        encode(&reply)
    });
}

fn session_with(device: &MockTransport) -> Result<DeviceSession, ClientError> {
    let port = MockPort::with_device(device.clone());
    DeviceSession::new(Arc::new(port), ClientConfig::default())
}

fn sent_commands(device: &MockTransport) -> Vec<Value> {
    device
        .write_history()
        .iter()
        .filter_map(|frame| decode_command(frame))
        .collect()
}

mod lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_reports_device_info() -> TestResult {
        let device = MockTransport::new();
        let session = session_with(&device)?;
        assert_eq!(session.state(), ConnectionState::Disconnected);

        let result = session.connect().await;
        let info = result.into_result()?;
        assert_eq!(info.product_name, "MacroPad");
        assert_eq!(info.serial_number.as_deref(), Some("MOCK-0001"));
        assert_eq!(info.firmware_version, "0x10000");
        assert!(session.is_connected());
        assert_eq!(session.connection_info(), Some(info));
        Ok(())
    }

    #[cfg(feature = "usb")]
    #[test]
    fn test_usb_session_starts_disconnected() -> TestResult {
        let session = DeviceSession::usb(ClientConfig::default())?;
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert!(session.connection_info().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_connect_without_device_fails() -> TestResult {
        let session = DeviceSession::new(Arc::new(MockPort::new()), ClientConfig::default())?;
        let result = session.connect().await;
        assert!(result.data.is_none());
        assert!(result.error.is_some_and(|e| e.contains("not found")));
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert!(session.last_error().is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_disconnect_when_not_connected() -> TestResult {
        let session = session_with(&MockTransport::new())?;
        let result = session.disconnect().await;
        assert_eq!(result.into_result()?, "Device was not connected.");
        assert_eq!(session.state(), ConnectionState::Disconnected);
        Ok(())
    }

    #[tokio::test]
    async fn test_disconnect_closes_and_clears_cache() -> TestResult {
        let device = MockTransport::new();
        simulate(&device, |_, _| None);
        let session = session_with(&device)?;
        session.try_connect().await?;
        session.try_get_config().await?;
        assert!(session.cached_config().is_some());

        assert_eq!(session.try_disconnect().await?, DISCONNECTED_MESSAGE);
        assert!(device.is_closed());
        assert!(session.cached_config().is_none());
        assert!(!session.is_connected());
        Ok(())
    }

    #[tokio::test]
    async fn test_commands_require_connection() -> TestResult {
        let session = session_with(&MockTransport::new())?;
        let result = session.get_config().await;
        assert_eq!(result.error.as_deref(), Some("Device not connected"));
        assert_eq!(session.last_error().as_deref(), Some("Device not connected"));
        Ok(())
    }

    #[tokio::test]
    async fn test_reboot_closes_connection() -> TestResult {
        let device = MockTransport::new();
        simulate(&device, |_, _| None);
        let session = session_with(&device)?;
        session.try_connect().await?;

        assert!(session.try_reboot().await?);
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert!(device.is_closed());
        assert!(matches!(
            session.try_get_config().await,
            Err(ClientError::NotConnected)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_reboot_also_closes_connection() -> TestResult {
        let device = MockTransport::new();
        simulate(&device, |kind, header| {
            (kind == "Reboot").then(|| {
                json!({"Error": {"header": header, "message": "Reboot refused", "errorCode": 3}})
            })
        });
        let session = session_with(&device)?;
        session.try_connect().await?;

        let result = session.reboot().await;
        assert_eq!(
            result.error.as_deref(),
            Some("Device Error: Reboot refused (Code: 3)")
        );
        assert!(!session.is_connected());
        Ok(())
    }

    #[tokio::test]
    async fn test_transport_loss_marks_disconnected() -> TestResult {
        let device = MockTransport::new();
        simulate(&device, |_, _| None);
        let session = session_with(&device)?;
        session.try_connect().await?;
        session.try_get_config().await?;

        device.disconnect();
        let result = session.try_get_config().await;
        assert_eq!(
            result,
            Err(ClientError::Transport(TransportError::Disconnected))
        );
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert!(session.cached_config().is_none());
        Ok(())
    }
}

mod config_tests {
    use super::*;

    #[tokio::test]
    async fn test_get_config_normalizes_slots() -> TestResult {
        let device = MockTransport::new();
        simulate(&device, |_, _| None);
        let session = session_with(&device)?;
        session.try_connect().await?;

        let config = session.get_config().await.into_result()?;
        assert_eq!(config.mapping(0), Some(&[ConfigAction::KeyRelease][..]));
        assert_eq!(config.button_name(0), Some("Vol+"));
        assert_eq!(
            serde_json::to_value(&config.mappings)?,
            json!({"0": [{"type": "KeyRelease"}]})
        );
        assert_eq!(session.cached_config(), Some(config));

        let sent = sent_commands(&device);
        assert_eq!(
            sent.first(),
            Some(&json!({"type": "GetConfig", "header": {"version": 65536, "correlationId": 1}}))
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_set_config_translates_slots_and_refreshes() -> TestResult {
        let device = MockTransport::new();
        simulate(&device, |_, _| None);
        let session = session_with(&device)?;
        session.try_connect().await?;

        let mut config = DeviceConfig::default();
        config
            .mappings
            .insert(SlotKey::Slot(0), vec![ConfigAction::Delay { ms: 100 }]);
        assert!(session.set_config(config).await.into_result()?);

        let sent = sent_commands(&device);
        assert_eq!(sent.len(), 2);
        let set = sent.first().ok_or("no SetConfig sent")?;
        assert_eq!(set.get("type"), Some(&json!("SetConfig")));
        assert_eq!(
            set.pointer("/config/mappings"),
            Some(&json!({"1": [{"Delay": {"ms": 100}}]}))
        );
        assert_eq!(
            sent.get(1).and_then(|c| c.get("type")),
            Some(&json!("GetConfig"))
        );
        assert!(session.cached_config().is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_full_set_config_deletes_dropped_widgets() -> TestResult {
        let device = MockTransport::new();
        simulate(&device, |kind, header| {
            (kind == "GetConfig").then(|| {
                let widget = |title: &str| {
                    json!({"title": title, "kind": {"Image": "http://img"}, "update_interval_seconds": 60})
                };
                json!({"Config": {"header": header, "config": {
                    "settings": {},
                    "mappings": {},
                    "widgets": {"1": widget("Clock"), "2": widget("Weather")}
                }}})
            })
        });
        let session = session_with(&device)?;
        session.try_connect().await?;

        let mut config = session.try_get_config().await?;
        assert!(config.widgets.remove(&2).is_some());
        session.try_set_config(config).await?;

        let sent = sent_commands(&device);
        let set = sent
            .iter()
            .find(|c| c.get("type") == Some(&json!("SetConfig")))
            .ok_or("no SetConfig sent")?;
        assert_eq!(set.pointer("/config/widgets/2"), Some(&Value::Null));
        assert_eq!(
            set.pointer("/config/widgets/1/title"),
            Some(&json!("Clock"))
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_partial_set_config_omits_unset_sections() -> TestResult {
        let device = MockTransport::new();
        simulate(&device, |_, _| None);
        let session = session_with(&device)?;
        session.try_connect().await?;

        let patch = ConfigPatch::new().button_name(2, "Mute");
        session.try_set_config(patch).await?;

        let sent = sent_commands(&device);
        let set = sent.first().ok_or("no SetConfig sent")?;
        assert_eq!(set.pointer("/config/button_names"), Some(&json!({"2": "Mute"})));
        assert!(set.pointer("/config/widgets").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_domain_failure_message() -> TestResult {
        let device = MockTransport::new();
        simulate(&device, |kind, header| {
            (kind == "SetConfig").then(|| {
                json!({"Ack": {"header": header, "message": "Mapping table full", "success": false}})
            })
        });
        let session = session_with(&device)?;
        session.try_connect().await?;

        let result = session.set_config(ConfigPatch::new().api_key("k")).await;
        assert_eq!(result.error.as_deref(), Some("Mapping table full"));
        assert!(session.is_connected());
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_read_keeps_cached_config() -> TestResult {
        let device = MockTransport::new();
        simulate(&device, |_, _| None);
        let session = session_with(&device)?;
        session.try_connect().await?;
        let before = session.try_get_config().await?;

        simulate(&device, |_, header| {
            Some(json!({"Error": {"header": header, "message": "Flash read failed", "errorCode": 12}}))
        });
        let result = session.get_config().await;
        assert_eq!(
            result.error.as_deref(),
            Some("Device Error: Flash read failed (Code: 12)")
        );
        assert_eq!(session.cached_config(), Some(before));
        assert!(session.is_connected());
        assert_eq!(
            session.last_error().as_deref(),
            Some("Device Error: Flash read failed (Code: 12)")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_config_refreshes() -> TestResult {
        let device = MockTransport::new();
        simulate(&device, |_, _| None);
        let session = session_with(&device)?;
        session.try_connect().await?;

        assert!(session.try_reset_config().await?);
        let kinds: Vec<Value> = sent_commands(&device)
            .iter()
            .filter_map(|c| c.get("type").cloned())
            .collect();
        assert_eq!(kinds, vec![json!("ResetConfig"), json!("GetConfig")]);
        assert!(session.last_error().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_debug_log_most_recent_first() -> TestResult {
        let device = MockTransport::new();
        simulate(&device, |_, _| None);
        let session = session_with(&device)?;
        session.try_connect().await?;
        session.try_get_config().await?;

        let entries = session.debug_log().entries();
        assert_eq!(entries.len(), 2);
        let newest = entries.first().ok_or("empty log")?;
        assert_eq!(newest.direction, LogDirection::Received);
        assert!(newest.data.contains("Vol+"));
        Ok(())
    }
}

mod concurrency_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_second_call_while_busy_is_rejected() -> TestResult {
        let device = MockTransport::new();
        let session = session_with(&device)?;
        session.try_connect().await?;

        // Device never answers, so the first call holds the session until its deadline
        let (first, second) = tokio::join!(session.try_get_config(), session.try_reset_config());
        assert_eq!(second, Err(ClientError::Busy));
        assert_eq!(first, Err(ClientError::timeout(5000)));
        assert_eq!(device.write_history().len(), 1);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_usable_after_timeout() -> TestResult {
        let device = MockTransport::new();
        let port = MockPort::with_device(device.clone());
        let config = ClientConfig::builder()
            .request_timeout(Duration::from_millis(200))
            .build()?;
        let session = DeviceSession::new(Arc::new(port), config)?;
        session.try_connect().await?;

        assert!(matches!(
            session.try_get_config().await,
            Err(ClientError::Timeout { .. })
        ));
        assert!(session.is_connected());

        simulate(&device, |_, _| None);
        let config = session.try_get_config().await?;
        assert_eq!(config.button_name(0), Some("Vol+"));
        Ok(())
    }
}
