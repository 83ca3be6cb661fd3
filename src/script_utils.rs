/// Script utilities: recover a payer address from a textual signature script
/// and classify a textual output script against known spending templates.
///
/// Both functions work on the ASM rendering explorers return (space separated
/// opcodes and hex pushes), not on raw script bytes.

use once_cell::sync::Lazy;

use crate::address::pubkey_to_p2pkh_address;
use crate::error::DecodeError;

pub const UNKNOWN_SCRIPT_TYPE: &str = "unknown";

/// Derive the legacy base58check address of the public key pushed as the
/// second token of `script` (`<signature> <pubkey>`).
pub fn address_from_signature_script(script: &str) -> Result<String, DecodeError> {
    let tokens: Vec<&str> = script.split_whitespace().collect();
    let pubkey_hex = tokens
        .get(1)
        .ok_or(DecodeError::MissingPublicKey { tokens: tokens.len() })?;

    let pubkey = hex::decode(pubkey_hex)?;
    Ok(pubkey_to_p2pkh_address(&pubkey))
}

/// One position in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateToken {
    /// Opcode or literal that must appear verbatim
    Op(&'static str),
    /// Any non-empty run of hex digits
    Hex,
    /// Exactly 20 bytes of hex
    Hash20,
    /// Exactly 32 bytes of hex
    Hash32,
    /// Compressed (33 byte) or uncompressed (65 byte) public key
    PubKey,
}

impl TemplateToken {
    fn matches(&self, token: &str) -> bool {
        match self {
            TemplateToken::Op(op) => token == *op,
            TemplateToken::Hex => is_hex_run(token),
            TemplateToken::Hash20 => token.len() == 40 && is_hex_run(token),
            TemplateToken::Hash32 => token.len() == 64 && is_hex_run(token),
            TemplateToken::PubKey => (token.len() == 66 || token.len() == 130) && is_hex_run(token),
        }
    }
}

fn is_hex_run(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_hexdigit())
}

#[derive(Debug, Clone)]
pub struct ScriptTemplate {
    pub name: &'static str,
    pub tokens: Vec<TemplateToken>,
}

impl ScriptTemplate {
    pub fn new(name: &'static str, tokens: Vec<TemplateToken>) -> Self {
        Self { name, tokens }
    }

    /// Anchored at the start: the template must match the leading tokens of
    /// the script. Anything after them is ignored.
    pub fn matches(&self, script: &str) -> bool {
        let mut script_tokens = script.split_whitespace();
        self.tokens.iter().all(|expected| {
            script_tokens
                .next()
                .map_or(false, |token| expected.matches(token))
        })
    }
}

/// Ordered template table. When several templates match a script, the one
/// that appears last wins.
#[derive(Debug, Clone)]
pub struct TemplateTable {
    templates: Vec<ScriptTemplate>,
}

impl TemplateTable {
    pub fn new(templates: Vec<ScriptTemplate>) -> Self {
        Self { templates }
    }

    /// The built-in table:
    ///
    /// 1. Pay to Public Key Hash: `OP_DUP OP_HASH160 <hex> OP_EQUALVERIFY OP_CHECKSIG`
    /// 2. Pay to Script Hash: `OP_HASH160 <hex> OP_EQUAL`
    /// 3. Pay to Public Key: `<pubkey> OP_CHECKSIG`
    /// 4. Null Data: `OP_RETURN`
    /// 5. Pay to Witness Public Key Hash: `0 <hash20>`
    /// 6. Pay to Witness Script Hash: `0 <hash32>`
    pub fn standard() -> Self {
        use TemplateToken::*;

        Self::new(vec![
            ScriptTemplate::new(
                "Pay to Public Key Hash",
                vec![Op("OP_DUP"), Op("OP_HASH160"), Hex, Op("OP_EQUALVERIFY"), Op("OP_CHECKSIG")],
            ),
            ScriptTemplate::new(
                "Pay to Script Hash",
                vec![Op("OP_HASH160"), Hex, Op("OP_EQUAL")],
            ),
            ScriptTemplate::new("Pay to Public Key", vec![PubKey, Op("OP_CHECKSIG")]),
            ScriptTemplate::new("Null Data", vec![Op("OP_RETURN")]),
            ScriptTemplate::new("Pay to Witness Public Key Hash", vec![Op("0"), Hash20]),
            ScriptTemplate::new("Pay to Witness Script Hash", vec![Op("0"), Hash32]),
        ])
    }

    pub fn templates(&self) -> &[ScriptTemplate] {
        &self.templates
    }

    pub fn classify(&self, script: &str) -> &'static str {
        self.templates
            .iter()
            .rev()
            .find(|template| template.matches(script))
            .map_or(UNKNOWN_SCRIPT_TYPE, |template| template.name)
    }
}

static STANDARD_TEMPLATES: Lazy<TemplateTable> = Lazy::new(TemplateTable::standard);

/// Classify an output script against the built-in template table.
/// Returns `"unknown"` when nothing matches.
pub fn classify_output_script(script: &str) -> String {
    STANDARD_TEMPLATES.classify(script).to_string()
}
