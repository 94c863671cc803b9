use crate::broker::{BrokerClient, BrokerError};
use async_trait::async_trait;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use std::time::Duration;

/// `BrokerClient` backed by `rdkafka`'s `FutureProducer`.
///
/// The producer passed in MUST already be configured with
/// `enable.idempotence=true`, `acks=all`, and
/// `max.in.flight.requests.per.connection=5` — this type does not set
/// those itself, it only sends records.
pub struct KafkaBrokerClient {
    producer: FutureProducer,
    request_timeout: Duration,
}

impl KafkaBrokerClient {
    pub fn new(producer: FutureProducer, request_timeout: Duration) -> Self {
        Self {
            producer,
            request_timeout,
        }
    }
}

#[async_trait]
impl BrokerClient for KafkaBrokerClient {
    async fn send(&self, topic: &str, key: &str, value: &[u8]) -> Result<(), BrokerError> {
        let record = FutureRecord::to(topic).key(key).payload(value);

        self.producer
            .send(record, Timeout::After(self.request_timeout))
            .await
            .map(|_| ())
            .map_err(|(err, _)| classify(&err))
    }
}

fn classify(err: &rdkafka::error::KafkaError) -> BrokerError {
    use rdkafka::types::RDKafkaErrorCode;

    let code = err.rdkafka_error_code();
    let transient = matches!(
        code,
        Some(RDKafkaErrorCode::OperationTimedOut)
            | Some(RDKafkaErrorCode::AllBrokersDown)
            | Some(RDKafkaErrorCode::BrokerTransportFailure)
            | Some(RDKafkaErrorCode::NotLeaderForPartition)
            | Some(RDKafkaErrorCode::RequestTimedOut)
            | Some(RDKafkaErrorCode::NetworkException)
    );

    if transient {
        BrokerError::Transient(err.to_string())
    } else {
        BrokerError::Permanent(err.to_string())
    }
}
