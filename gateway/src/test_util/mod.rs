//! In-memory backends for exercising the gateway without AWS or network access.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use inference_gateway_common::CompletionRequest;

use crate::backends::{BackendError, CompletionBackend, FoundationBackend, TensorBackend};
use crate::config::Targets;
use crate::gateway::{Backends, Gateway};

#[derive(Debug, Default)]
struct Calls {
    tensor: Vec<(String, Vec<u8>)>,
    foundation: Vec<(String, Vec<u8>)>,
    completion: Vec<(String, CompletionRequest)>,
}

/// Canned replies for all three backend families, recording every call.
///
/// Clones share the call log, so a test can keep one handle and give
/// another to the gateway.
#[derive(Debug, Clone)]
pub struct FakeBackends {
    tensor_reply: Vec<u8>,
    foundation_reply: Vec<u8>,
    completion_reply: String,
    fail: bool,
    calls: Arc<Mutex<Calls>>,
}

impl FakeBackends {
    pub fn new() -> Self {
        Self {
            tensor_reply: b"{}".to_vec(),
            foundation_reply: br#"{"content":[]}"#.to_vec(),
            completion_reply: r#"{"response":""}"#.to_string(),
            fail: false,
            calls: Arc::new(Mutex::new(Calls::default())),
        }
    }

    pub fn with_tensor_reply(mut self, reply: impl Into<Vec<u8>>) -> Self {
        self.tensor_reply = reply.into();
        self
    }

    pub fn with_foundation_reply(mut self, reply: impl Into<Vec<u8>>) -> Self {
        self.foundation_reply = reply.into();
        self
    }

    pub fn with_completion_reply(mut self, reply: impl Into<String>) -> Self {
        self.completion_reply = reply.into();
        self
    }

    /// Every backend call fails with a service error.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn tensor_calls(&self) -> Vec<(String, Vec<u8>)> {
        self.calls.lock().unwrap().tensor.clone()
    }

    pub fn foundation_calls(&self) -> Vec<(String, Vec<u8>)> {
        self.calls.lock().unwrap().foundation.clone()
    }

    pub fn completion_calls(&self) -> Vec<(String, CompletionRequest)> {
        self.calls.lock().unwrap().completion.clone()
    }

    pub fn call_count(&self) -> usize {
        let calls = self.calls.lock().unwrap();
        calls.tensor.len() + calls.foundation.len() + calls.completion.len()
    }

    pub fn backends(&self) -> Backends {
        let shared = Arc::new(self.clone());
        Backends {
            tensor: shared.clone(),
            foundation: shared.clone(),
            completion: shared,
        }
    }
}

impl Default for FakeBackends {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TensorBackend for FakeBackends {
    async fn invoke(&self, endpoint: &str, body: Vec<u8>) -> Result<Vec<u8>, BackendError> {
        self.calls
            .lock()
            .unwrap()
            .tensor
            .push((endpoint.to_string(), body));
        if self.fail {
            return Err(BackendError::Tensor {
                endpoint: endpoint.to_string(),
                message: "Endpoint is not in service".to_string(),
            });
        }
        Ok(self.tensor_reply.clone())
    }
}

#[async_trait]
impl FoundationBackend for FakeBackends {
    async fn invoke(&self, model_id: &str, payload: Vec<u8>) -> Result<Vec<u8>, BackendError> {
        self.calls
            .lock()
            .unwrap()
            .foundation
            .push((model_id.to_string(), payload));
        if self.fail {
            return Err(BackendError::Foundation {
                model_id: model_id.to_string(),
                message: "AccessDeniedException".to_string(),
            });
        }
        Ok(self.foundation_reply.clone())
    }
}

#[async_trait]
impl CompletionBackend for FakeBackends {
    async fn complete(
        &self,
        url: &str,
        request: &CompletionRequest,
    ) -> Result<String, BackendError> {
        self.calls
            .lock()
            .unwrap()
            .completion
            .push((url.to_string(), request.clone()));
        if self.fail {
            return Err(BackendError::Status {
                status: 502,
                body: "bad gateway".to_string(),
            });
        }
        Ok(self.completion_reply.clone())
    }
}

/// A gateway backed by `fakes` with fixed targets.
pub fn gateway_with(fakes: &FakeBackends, targets: Targets) -> Gateway {
    Gateway::new(fakes.backends(), Arc::new(targets))
}
