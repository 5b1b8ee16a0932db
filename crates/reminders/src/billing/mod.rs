mod charge_due;
mod send_notices;

pub use charge_due::ChargeDueSubscriptionsUseCase;
pub use send_notices::SendChargeNoticesUseCase;
