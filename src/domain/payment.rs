/// Provider-side representation of an in-progress client payment.
#[derive(Debug, Clone)]
pub struct PaymentIntentView {
    pub id: String,
    pub client_secret: String,
    pub status: String,
}
