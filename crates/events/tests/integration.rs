//! Integration tests for the event system

#[cfg(test)]
mod tests {
    use capsule_errors::InstallError;
    use capsule_events::*;

    struct Holder {
        sender: Option<EventSender>,
    }

    impl EventEmitter for Holder {
        fn event_sender(&self) -> Option<&EventSender> {
            self.sender.as_ref()
        }
    }

    #[tokio::test]
    async fn test_emit_through_holder() {
        let (tx, mut rx) = channel();
        let holder = Holder { sender: Some(tx) };

        holder.emit_operation_started("isolate org/button");
        holder.emit_warning("careful");

        match rx.recv().await.unwrap() {
            AppEvent::General(GeneralEvent::OperationStarted { operation }) => {
                assert_eq!(operation, "isolate org/button");
            }
            other => panic!("unexpected event: {other:?}"),
        }
        let warning = rx.recv().await.unwrap();
        assert_eq!(warning.level(), tracing::Level::WARN);
    }

    #[test]
    fn test_emit_without_sender_is_noop() {
        let holder = Holder { sender: None };
        holder.emit_debug("nobody listens");
    }

    #[test]
    fn test_emit_after_receiver_dropped() {
        let (tx, rx) = channel();
        drop(rx);
        tx.emit_debug("dropped on the floor");
    }

    #[test]
    fn test_failure_context_from_error() {
        let err = InstallError::SpawnFailed {
            program: "npm".into(),
            message: "not found".into(),
        };
        let failure = FailureContext::from_error(&err);
        assert_eq!(failure.code.as_deref(), Some("install.spawn_failed"));
        assert!(failure.hint.is_some());
        assert!(!failure.retryable);

        let event = AppEvent::Install(InstallEvent::Failed {
            component: "org/button@1.0.0".into(),
            cwd: "/tmp/env".into(),
            failure,
        });
        assert_eq!(event.level(), tracing::Level::ERROR);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"domain\":\"install\""));
    }
}
