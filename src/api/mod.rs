pub mod models_ws;
pub mod routes;
pub mod websocket;
