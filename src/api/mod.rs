//! Тонкий API-слой: команды, запросы и DTO поверх MatchService.
//!
//! Транспорт (HTTP, GraphQL, что угодно) живёт снаружи и просто
//! маппит свои запросы в эти типы.

pub mod commands;
pub mod dto;
pub mod queries;

pub use commands::{Command, CreateMatchCommand, SubmitActionCommand};
pub use dto::{MatchViewDto, ParticipantViewDto};
pub use queries::{build_match_view, Query, QueryResponse};
