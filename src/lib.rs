// Biblioteca raíz del crate `gestionpps`.
// Clasificación de lanzamientos PPS en bandejas de gestión, acceso a datos
// (SQLite o Postgres) y la API HTTP que expone ambas cosas.
pub mod config;
pub mod datos;
pub mod error;
pub mod gestion;
pub mod models;
pub mod server;
pub mod server_handlers;

/// Ejecuta el servidor HTTP (reexport para facilitar uso desde `main`)
pub use server::run_server;

pub use config::Config;
pub use error::{ErrorConfig, ErrorDatos};
pub use gestion::{clasificar, clasificar_con_opciones, OpcionesClasificacion};
