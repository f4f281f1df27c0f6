// Domain layer: core models and ports (interfaces) the engine is written against.

pub mod model;
pub mod ports;
