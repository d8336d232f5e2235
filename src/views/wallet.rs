/*
 * Wallet connect badge
 */

use crate::session::{SessionContext, SessionState};
use crate::units;

#[must_use]
pub fn wallet_label(ctx: &SessionContext) -> String {
    match (ctx.state, ctx.account) {
        (SessionState::Connected, Some(account)) => units::truncate_address(&account, 4),
        (SessionState::Connecting, _) => "Connecting...".to_string(),
        _ => "Connect Wallet".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::BASE_SEPOLIA;

    #[test]
    fn disconnected_session_offers_connect() {
        let ctx = SessionContext::disconnected(BASE_SEPOLIA);
        assert_eq!(wallet_label(&ctx), "Connect Wallet");
    }

    #[test]
    fn connecting_session_shows_progress() {
        let mut ctx = SessionContext::disconnected(BASE_SEPOLIA);
        ctx.state = SessionState::Connecting;
        assert_eq!(wallet_label(&ctx), "Connecting...");
    }
}
