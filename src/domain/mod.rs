// Domain layer: response/spec models and the ports output validation talks through.

pub mod model;
pub mod ports;
