//! Client-side pipeline library for an image-to-speech platform.
//!
//! The platform backend exposes four operations over HTTP — text
//! extraction (OCR), captioning, translation and speech synthesis — and
//! this crate provides everything a client needs to chain them over one
//! image: a typed API gateway, a result store with text precedence, a
//! single-slot audio lifecycle, and a playback controller with bounded
//! failure recovery.
//!
//! # Modules
//!
//! | Module     | Responsibility |
//! |------------|----------------|
//! | [`api`]    | HTTP gateway, wire types, operation envelopes |
//! | [`config`] | TOML settings and platform paths |
//! | [`media`]  | Image payloads, audio handles, sinks, playback |
//! | [`pipeline`] | Orchestrator, result store, shared session state |
//! | [`session`]  | Persisted local account store |
//!
//! # Flow
//!
//! ```text
//! image ──► extract / caption ──► translate ──► synthesize ──► play/save
//!              │                     │              │
//!              └──── ResultStore (most refined text feeds the next op) ──┘
//! ```
//!
//! See [`pipeline::PipelineOrchestrator`] for the entry point.

pub mod api;
pub mod config;
pub mod media;
pub mod pipeline;
pub mod session;
