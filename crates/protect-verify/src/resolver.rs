//! Whitelisting-rule resolution.
//!
//! Rules are keyed by `(currency, network)` for addresses and
//! `(blockchain, network)` for contract addresses. Matching is byte-exact
//! and case-sensitive on the wire values; rules are expected to be unique
//! per key, so more than one match is a configuration defect, not a choice.

use protect_types::error::IntegrityError;
use protect_types::rules::{
    AddressWhitelistingRule, ContractAddressWhitelistingRule, RulesContainer,
};

/// Finds the single address-whitelisting rule for `(currency, network)`.
///
/// # Errors
///
/// [`IntegrityError::NoApplicableRule`] on zero matches,
/// [`IntegrityError::AmbiguousRule`] on more than one.
pub fn resolve_address_rule<'c>(
    container: &'c RulesContainer,
    currency: &str,
    network: &str,
) -> Result<&'c AddressWhitelistingRule, IntegrityError> {
    let mut matches = container
        .address_whitelisting_rules
        .iter()
        .filter(|rule| rule.currency == currency && rule.network == network);
    let first = matches.next().ok_or_else(|| IntegrityError::NoApplicableRule {
        key: currency.to_owned(),
        network: network.to_owned(),
    })?;
    if matches.next().is_some() {
        return Err(IntegrityError::AmbiguousRule {
            key: currency.to_owned(),
            network: network.to_owned(),
        });
    }
    Ok(first)
}

/// Finds the single contract-address-whitelisting rule for
/// `(blockchain, network)`. Same match policy as [`resolve_address_rule`].
pub fn resolve_contract_rule<'c>(
    container: &'c RulesContainer,
    blockchain: &str,
    network: &str,
) -> Result<&'c ContractAddressWhitelistingRule, IntegrityError> {
    let mut matches = container
        .contract_address_whitelisting_rules
        .iter()
        .filter(|rule| rule.blockchain == blockchain && rule.network == network);
    let first = matches.next().ok_or_else(|| IntegrityError::NoApplicableRule {
        key: blockchain.to_owned(),
        network: network.to_owned(),
    })?;
    if matches.next().is_some() {
        return Err(IntegrityError::AmbiguousRule {
            key: blockchain.to_owned(),
            network: network.to_owned(),
        });
    }
    Ok(first)
}
