mod notifier;
mod payment;
mod series_metadata;

pub use notifier::{BotApiNotifier, INotifier, InMemoryNotifier, Recipient, SentMessage};
pub use payment::{ChargeOutcome, IPaymentGateway, InMemoryPaymentGateway, PaymentGatewayRestApi};
pub use series_metadata::{
    ISeriesMetadataService, InMemorySeriesMetadataService, SeriesMetadataRestApi,
};
