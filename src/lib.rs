#![warn(clippy::perf)]
#![warn(clippy::unwrap_used)]

pub mod framework;

pub mod towns;

pub mod openaq;

pub mod lookup;

pub mod server;

pub mod game;
