/// Middleware modules for the API server
///
/// This module contains the route guards:
/// - Permission gate consulting the shared permission table
/// - Task delete-state gate for the update path

pub mod guard;
