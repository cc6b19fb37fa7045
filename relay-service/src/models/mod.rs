pub mod generation;

pub use generation::{
    Blob, Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    Modality, Part, SpeechConfig, UsageMetadata,
};
