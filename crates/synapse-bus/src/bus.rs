//! The dispatch engine: [`BusBuilder`] and [`SemanticBus`].

use std::collections::HashMap;
use std::sync::Arc;

use metrics::counter;
use synapse_core::SemanticMessage;
use tracing::{debug, warn};

use crate::errors::{BusError, Result};
use crate::membrane::{Membrane, MembraneId};
use crate::receptor::{ErasedReceptor, Receptor};
use crate::report::{DispatchReport, ReceptorFailure};

/// Startup-only bus assembly.
///
/// Membranes and receptors are registered single-threaded during
/// bootstrap; [`build`](Self::build) freezes the registries into an
/// immutable [`SemanticBus`].
#[derive(Default)]
pub struct BusBuilder {
    membranes: HashMap<MembraneId, Membrane>,
    halt_on_failure: bool,
}

impl BusBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Halt the remaining receptors for a message after the first failure.
    /// Default is fan-out with per-receptor failure isolation.
    #[must_use]
    pub fn halt_on_failure(mut self, halt: bool) -> Self {
        self.halt_on_failure = halt;
        self
    }

    /// Create a membrane with no receptors (publishing into it is a
    /// silent no-op until receptors are registered).
    #[must_use]
    pub fn membrane(mut self, name: &str) -> Self {
        let _ = self.ensure_membrane(name);
        self
    }

    /// Register a receptor for messages of type `M` within `membrane`,
    /// creating the membrane if needed. Order of registration is the
    /// order of invocation.
    pub fn register<M: SemanticMessage>(
        &mut self,
        membrane: &str,
        receptor: Arc<dyn Receptor<M>>,
    ) -> Result<()> {
        let token = synapse_core::message::MessageType::of::<M>();
        let erased = ErasedReceptor::new(receptor);
        self.ensure_membrane(membrane)
            .register(token.id, token.name, erased)
    }

    /// Freeze into an immutable bus.
    pub fn build(self) -> SemanticBus {
        SemanticBus {
            membranes: self.membranes,
            halt_on_failure: self.halt_on_failure,
        }
    }

    fn ensure_membrane(&mut self, name: &str) -> &mut Membrane {
        let id = MembraneId::new(name);
        self.membranes
            .entry(id.clone())
            .or_insert_with(|| Membrane::new(id))
    }
}

/// The immutable dispatch engine.
///
/// All registries are frozen at build time, so `publish` performs
/// read-only lookups and is safe under any number of concurrent publishes.
/// Receptors for one message run sequentially in registration order;
/// publishes for different messages do not serialize against each other.
pub struct SemanticBus {
    membranes: HashMap<MembraneId, Membrane>,
    halt_on_failure: bool,
}

impl SemanticBus {
    /// Publish an owned message into a membrane.
    pub async fn publish<M: SemanticMessage>(
        &self,
        membrane: &str,
        message: M,
    ) -> Result<DispatchReport> {
        self.publish_arc(membrane, Arc::new(message)).await
    }

    /// Publish a shared message into a membrane.
    ///
    /// Resolves receptors by the message's exact runtime type. Zero
    /// registered receptors is not an error (the report shows nothing
    /// invoked); an unknown membrane is.
    pub async fn publish_arc(
        &self,
        membrane: &str,
        message: Arc<dyn SemanticMessage>,
    ) -> Result<DispatchReport> {
        let Some(partition) = self.membranes.get(membrane) else {
            return Err(BusError::UnknownMembrane {
                membrane: membrane.to_owned(),
            });
        };

        let message_type = message.type_name();
        let type_id = message.as_any().type_id();
        counter!("bus_publish_total").increment(1);

        let mut delivered = 0usize;
        let mut failures = Vec::new();
        for receptor in partition.receptors_for(type_id) {
            match receptor.invoke(self, partition.id(), message.as_ref()).await {
                Ok(()) => delivered += 1,
                Err(error) => {
                    counter!("bus_receptor_failures_total").increment(1);
                    warn!(
                        membrane,
                        message_type,
                        receptor = receptor.name,
                        error = %error,
                        "receptor failed"
                    );
                    failures.push(ReceptorFailure {
                        receptor: receptor.name,
                        error,
                    });
                    if self.halt_on_failure {
                        break;
                    }
                }
            }
        }

        debug!(
            membrane,
            message_type,
            delivered,
            failed = failures.len(),
            "published message"
        );
        Ok(DispatchReport {
            membrane: partition.id().clone(),
            message_type,
            delivered,
            failures,
        })
    }

    /// Whether a membrane exists.
    pub fn has_membrane(&self, name: &str) -> bool {
        self.membranes.contains_key(name)
    }

    /// Number of receptors registered for `M` within a membrane.
    pub fn receptor_count<M: SemanticMessage>(&self, membrane: &str) -> usize {
        let token = synapse_core::message::MessageType::of::<M>();
        self.membranes
            .get(membrane)
            .map_or(0, |m| m.receptor_count(token.id))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use synapse_core::routed_message;

    use super::*;
    use crate::receptor::ReceptorError;

    routed_message! {
        /// Test message.
        pub struct Ping {
            pub label: String => "Label",
        }
    }

    routed_message! {
        /// A second type, never delivered to Ping receptors.
        pub struct Pong {
            pub label: String => "Label",
        }
    }

    /// Appends its tag to a shared log on every invocation.
    struct Recorder {
        tag: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Receptor<Ping> for Recorder {
        async fn process(
            &self,
            _bus: &SemanticBus,
            _membrane: &MembraneId,
            message: &Ping,
        ) -> std::result::Result<(), ReceptorError> {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.tag, message.label));
            Ok(())
        }

        fn name(&self) -> &'static str {
            self.tag
        }
    }

    struct Failing;

    #[async_trait]
    impl Receptor<Ping> for Failing {
        async fn process(
            &self,
            _bus: &SemanticBus,
            _membrane: &MembraneId,
            _message: &Ping,
        ) -> std::result::Result<(), ReceptorError> {
            Err(ReceptorError::new("boom"))
        }

        fn name(&self) -> &'static str {
            "Failing"
        }
    }

    /// Re-publishes a Pong when it sees a Ping.
    struct Chainer;

    #[async_trait]
    impl Receptor<Ping> for Chainer {
        async fn process(
            &self,
            bus: &SemanticBus,
            membrane: &MembraneId,
            message: &Ping,
        ) -> std::result::Result<(), ReceptorError> {
            let pong = Pong {
                label: message.label.clone(),
                context: None,
            };
            let report = bus
                .publish(membrane.name(), pong)
                .await
                .map_err(|e| ReceptorError::new(e.to_string()))?;
            if report.is_clean() { Ok(()) } else { Err("chained publish failed".into()) }
        }
    }

    struct PongRecorder {
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Receptor<Pong> for PongRecorder {
        async fn process(
            &self,
            _bus: &SemanticBus,
            _membrane: &MembraneId,
            message: &Pong,
        ) -> std::result::Result<(), ReceptorError> {
            self.log.lock().unwrap().push(format!("pong:{}", message.label));
            Ok(())
        }
    }

    fn ping(label: &str) -> Ping {
        Ping {
            label: label.into(),
            context: None,
        }
    }

    fn recorder(tag: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Arc<dyn Receptor<Ping>> {
        Arc::new(Recorder {
            tag,
            log: Arc::clone(log),
        })
    }

    #[tokio::test]
    async fn receptors_run_exactly_once_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut builder = BusBuilder::new();
        builder.register("web", recorder("a", &log)).unwrap();
        builder.register("web", recorder("b", &log)).unwrap();
        builder.register("web", recorder("c", &log)).unwrap();
        let bus = builder.build();

        let report = bus.publish("web", ping("m1")).await.unwrap();
        assert_eq!(report.delivered, 3);
        assert!(report.is_clean());
        assert_eq!(*log.lock().unwrap(), vec!["a:m1", "b:m1", "c:m1"]);
    }

    #[tokio::test]
    async fn zero_receptors_is_a_silent_noop() {
        let bus = BusBuilder::new().membrane("web").build();
        let report = bus.publish("web", ping("m")).await.unwrap();
        assert_eq!(report.invoked(), 0);
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn unknown_membrane_is_an_error() {
        let bus = BusBuilder::new().membrane("web").build();
        let result = bus.publish("nope", ping("m")).await;
        assert_matches!(result, Err(BusError::UnknownMembrane { membrane }) if membrane == "nope");
    }

    #[tokio::test]
    async fn a_failure_does_not_halt_remaining_receptors() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut builder = BusBuilder::new();
        builder.register("web", recorder("a", &log)).unwrap();
        builder
            .register("web", Arc::new(Failing) as Arc<dyn Receptor<Ping>>)
            .unwrap();
        builder.register("web", recorder("b", &log)).unwrap();
        let bus = builder.build();

        let report = bus.publish("web", ping("m")).await.unwrap();
        assert_eq!(report.delivered, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].receptor, "Failing");
        assert_eq!(*log.lock().unwrap(), vec!["a:m", "b:m"]);
    }

    #[tokio::test]
    async fn halt_on_failure_stops_the_chain() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut builder = BusBuilder::new().halt_on_failure(true);
        builder
            .register("web", Arc::new(Failing) as Arc<dyn Receptor<Ping>>)
            .unwrap();
        builder.register("web", recorder("late", &log)).unwrap();
        let bus = builder.build();

        let report = bus.publish("web", ping("m")).await.unwrap();
        assert_eq!(report.delivered, 0);
        assert_eq!(report.failures.len(), 1);
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn other_types_and_membranes_are_never_invoked() {
        let ping_log = Arc::new(Mutex::new(Vec::new()));
        let pong_log = Arc::new(Mutex::new(Vec::new()));
        let mut builder = BusBuilder::new();
        builder.register("web", recorder("web", &ping_log)).unwrap();
        builder.register("admin", recorder("admin", &ping_log)).unwrap();
        builder
            .register(
                "web",
                Arc::new(PongRecorder {
                    log: Arc::clone(&pong_log),
                }) as Arc<dyn Receptor<Pong>>,
            )
            .unwrap();
        let bus = builder.build();

        let _ = bus.publish("web", ping("m")).await.unwrap();
        assert_eq!(*ping_log.lock().unwrap(), vec!["web:m"]);
        assert!(pong_log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_instance_registration_is_rejected() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let shared = recorder("dup", &log);
        let mut builder = BusBuilder::new();
        builder.register("web", Arc::clone(&shared)).unwrap();
        let err = builder.register("web", shared).unwrap_err();
        assert_matches!(err, BusError::DuplicateReceptor { .. });
    }

    #[tokio::test]
    async fn distinct_instances_of_one_type_are_allowed() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut builder = BusBuilder::new();
        builder.register("web", recorder("one", &log)).unwrap();
        builder.register("web", recorder("two", &log)).unwrap();
        let bus = builder.build();
        let report = bus.publish("web", ping("m")).await.unwrap();
        assert_eq!(report.delivered, 2);
    }

    #[tokio::test]
    async fn receptors_can_republish_into_the_same_membrane() {
        let pong_log = Arc::new(Mutex::new(Vec::new()));
        let mut builder = BusBuilder::new();
        builder
            .register("web", Arc::new(Chainer) as Arc<dyn Receptor<Ping>>)
            .unwrap();
        builder
            .register(
                "web",
                Arc::new(PongRecorder {
                    log: Arc::clone(&pong_log),
                }) as Arc<dyn Receptor<Pong>>,
            )
            .unwrap();
        let bus = builder.build();

        let report = bus.publish("web", ping("m")).await.unwrap();
        assert!(report.is_clean());
        assert_eq!(*pong_log.lock().unwrap(), vec!["pong:m"]);
    }

    #[tokio::test]
    async fn concurrent_publishes_do_not_interfere() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut builder = BusBuilder::new();
        builder.register("web", recorder("r", &log)).unwrap();
        let bus = Arc::new(builder.build());

        let mut handles = Vec::new();
        for i in 0..16 {
            let bus = Arc::clone(&bus);
            handles.push(tokio::spawn(async move {
                bus.publish("web", ping(&format!("m{i}"))).await.unwrap()
            }));
        }
        for handle in handles {
            let report = handle.await.unwrap();
            assert_eq!(report.delivered, 1);
        }
        assert_eq!(log.lock().unwrap().len(), 16);
    }
}
