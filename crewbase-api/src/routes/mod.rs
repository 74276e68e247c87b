/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (sign-up, sign-in, register, change-password)
/// - `users`: Current-user endpoints
/// - `admin`: Admin user management endpoints
/// - `tasks`: Task CRUD and delete lifecycle endpoints

pub mod admin;
pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;
