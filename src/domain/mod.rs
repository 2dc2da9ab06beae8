// Domain layer: core models, ports (interfaces) and the product entities.

pub mod credentials;
pub mod data;
pub mod datacite;
pub mod metadata;
pub mod model;
pub mod pid;
pub mod ports;
pub mod rdp;
pub mod service;
