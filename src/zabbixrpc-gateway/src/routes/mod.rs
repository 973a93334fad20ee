mod health;
mod hosts;
mod schema;
mod zabbix;

pub use health::health_routes;
pub use hosts::host_routes;
pub use schema::schema_routes;
pub use zabbix::zabbix_routes;
