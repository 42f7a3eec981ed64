pub mod reload_route;
