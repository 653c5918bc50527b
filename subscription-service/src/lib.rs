pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::subscriptions::create_subscription,
        handlers::subscriptions::list_subscriptions,
        handlers::subscriptions::get_subscription,
        handlers::subscriptions::update_subscription,
        handlers::subscriptions::delete_subscription,
        handlers::cost::calculate_total_cost,
    ),
    components(
        schemas(
            models::Subscription,
            handlers::subscriptions::SubscriptionRequest,
            handlers::cost::CostResponse,
        )
    ),
    tags(
        (name = "Subscriptions", description = "Subscription record management"),
        (name = "Cost", description = "Subscription cost aggregation"),
    )
)]
pub struct ApiDoc;

pub use startup::AppState;
