//! Implementaciones de `TransitionBackend` disponibles en la aplicación.
//! El backend real (HTTP autenticado) lo aporta el host; aquí vive la
//! versión en memoria usada por la demo y los tests de extremo a extremo.
pub mod implementations;
pub mod seed;
