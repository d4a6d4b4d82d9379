//! Request classification.
//!
//! The backend family is chosen from the request path alone. Matching is by
//! substring of the lower-cased path, so the gateway can be mounted behind
//! stage prefixes such as `/default/predict/sentiment_hf`.

use crate::error::{GatewayError, Result};

/// Path fragments served by the foundation-model backend.
pub const FOUNDATION_PATHS: [&str; 2] = ["/bedrock-chat", "/api/chat"];
/// Path fragments served by the third-party completion backend.
pub const THIRD_PARTY_PATHS: [&str; 2] = ["/hf-chat", "/api/completion"];

/// A model deployed behind its own tensor-serving endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TensorModel {
    MnistClassical,
    MnistHybrid,
    SentimentHf,
    SentimentSvmCv,
    SentimentSvmTfidf,
    Pneumonia,
}

impl TensorModel {
    pub const ALL: [TensorModel; 6] = [
        Self::MnistClassical,
        Self::MnistHybrid,
        Self::SentimentHf,
        Self::SentimentSvmCv,
        Self::SentimentSvmTfidf,
        Self::Pneumonia,
    ];

    /// Route fragment that selects this model.
    pub fn path(&self) -> &'static str {
        match self {
            Self::MnistClassical => "/predict/mnist_classical",
            Self::MnistHybrid => "/predict/mnist_hybrid",
            Self::SentimentHf => "/predict/sentiment_hf",
            Self::SentimentSvmCv => "/predict/sentiment_svm_cv",
            Self::SentimentSvmTfidf => "/predict/sentiment_svm_tfidf",
            Self::Pneumonia => "/predict/pneumonia",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MnistClassical => "mnist_classical",
            Self::MnistHybrid => "mnist_hybrid",
            Self::SentimentHf => "sentiment_hf",
            Self::SentimentSvmCv => "sentiment_svm_cv",
            Self::SentimentSvmTfidf => "sentiment_svm_tfidf",
            Self::Pneumonia => "pneumonia",
        }
    }
}

impl std::fmt::Display for TensorModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Backend family selected for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteDecision {
    /// Raw JSON forwarded to a tensor-serving endpoint.
    Tensor(TensorModel),
    /// Chat prompt translated for the active foundation model.
    Foundation,
    /// Chat prompt posted to the hosted completion service.
    ThirdParty,
}

impl std::fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tensor(model) => write!(f, "tensor:{}", model),
            Self::Foundation => write!(f, "foundation"),
            Self::ThirdParty => write!(f, "third_party"),
        }
    }
}

/// Classify a request path.
///
/// Foundation paths are checked first, then third-party paths, then tensor
/// routes. The first match wins.
pub fn classify(path: &str) -> Result<RouteDecision> {
    let path = path.to_lowercase();

    if FOUNDATION_PATHS.iter().any(|p| path.contains(p)) {
        return Ok(RouteDecision::Foundation);
    }
    if THIRD_PARTY_PATHS.iter().any(|p| path.contains(p)) {
        return Ok(RouteDecision::ThirdParty);
    }
    TensorModel::ALL
        .into_iter()
        .find(|model| path.contains(model.path()))
        .map(RouteDecision::Tensor)
        .ok_or(GatewayError::Unroutable(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tensor_routes() {
        for model in TensorModel::ALL {
            assert_eq!(classify(model.path()).unwrap(), RouteDecision::Tensor(model));
        }
    }

    #[test]
    fn test_stage_prefix_and_case() {
        assert_eq!(
            classify("/default/predict/sentiment_hf").unwrap(),
            RouteDecision::Tensor(TensorModel::SentimentHf)
        );
        assert_eq!(
            classify("/Predict/MNIST_Classical").unwrap(),
            RouteDecision::Tensor(TensorModel::MnistClassical)
        );
        assert_eq!(classify("/prod/BEDROCK-CHAT/chat").unwrap(), RouteDecision::Foundation);
    }

    #[test]
    fn test_similar_tensor_routes_are_disjoint() {
        assert_eq!(
            classify("/predict/sentiment_svm_cv").unwrap(),
            RouteDecision::Tensor(TensorModel::SentimentSvmCv)
        );
        assert_eq!(
            classify("/predict/sentiment_svm_tfidf").unwrap(),
            RouteDecision::Tensor(TensorModel::SentimentSvmTfidf)
        );
    }

    #[test]
    fn test_chat_routes() {
        assert_eq!(classify("/api/bedrock-chat").unwrap(), RouteDecision::Foundation);
        assert_eq!(classify("/bedrock-chat/chat").unwrap(), RouteDecision::Foundation);
        assert_eq!(classify("/hf-chat").unwrap(), RouteDecision::ThirdParty);
        assert_eq!(classify("/api/completion").unwrap(), RouteDecision::ThirdParty);
    }

    #[test]
    fn test_foundation_wins_over_other_families() {
        assert_eq!(
            classify("/bedrock-chat/predict/mnist_classical").unwrap(),
            RouteDecision::Foundation
        );
        assert_eq!(classify("/hf-chat/bedrock-chat").unwrap(), RouteDecision::Foundation);
        assert_eq!(
            classify("/hf-chat/predict/pneumonia").unwrap(),
            RouteDecision::ThirdParty
        );
    }

    #[test]
    fn test_unknown_path_reports_lowercased_path() {
        match classify("/Unknown") {
            Err(GatewayError::Unroutable(path)) => assert_eq!(path, "/unknown"),
            other => panic!("expected unroutable, got {:?}", other),
        }
        assert!(classify("").is_err());
        assert!(classify("/predict").is_err());
    }

    #[test]
    fn test_classification_is_deterministic() {
        for path in ["/api/bedrock-chat", "/hf-chat", "/predict/mnist_hybrid"] {
            assert_eq!(classify(path).unwrap(), classify(path).unwrap());
        }
    }
}
