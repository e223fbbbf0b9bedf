//! # Tasklist
//!
//! A server-rendered task management web application. Authenticated users
//! manage tasks (title, content, status, deadline) through HTML forms with
//! presence and uniqueness validation; the task listing and detail pages
//! are public.
//!
//! ## Modules
//!
//! - `app`: application state and router builder
//! - `config`: configuration management
//! - `db`: connection pool and migrations
//! - `models`: database models (users, tasks)
//! - `auth`: password hashing, sessions, and the login gate
//! - `flash`: one-time flash messages
//! - `validation`: form validation error accumulation
//! - `middleware`: HTTP method override for HTML forms
//! - `error`: error handling and HTTP response mapping
//! - `routes`: page and action handlers

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod flash;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod validation;
