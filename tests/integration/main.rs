mod http_api;
mod route_plan;
mod selection_behavior;
