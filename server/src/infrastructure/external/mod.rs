// External Service Adapters
//
// This module contains implementations for external services. Only the
// external metadata database client is in scope (§1): the donor's
// ffmpeg/nfo/chromaprint/whisper/ollama adapters back collaborators this
// spec never names (transcoding, audio fingerprinting, speech-to-text,
// translation) and have no counterpart here.

pub mod tmdb;

pub use tmdb::*;
