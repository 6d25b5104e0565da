//! Onboarding flows that ship with the crate.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::domain::{FlowSchema, parse_flow_schema};
use crate::io::load_document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFlow {
    Seller,
    Influencer,
    Mua,
    WeddingPlanner,
    Stylist,
}

impl BuiltinFlow {
    pub const ALL: [BuiltinFlow; 5] = [
        BuiltinFlow::Seller,
        BuiltinFlow::Influencer,
        BuiltinFlow::Mua,
        BuiltinFlow::WeddingPlanner,
        BuiltinFlow::Stylist,
    ];

    pub fn id(self) -> &'static str {
        match self {
            BuiltinFlow::Seller => "seller",
            BuiltinFlow::Influencer => "influencer",
            BuiltinFlow::Mua => "mua",
            BuiltinFlow::WeddingPlanner => "wedding-planner",
            BuiltinFlow::Stylist => "stylist",
        }
    }

    pub fn document_str(self) -> &'static str {
        match self {
            BuiltinFlow::Seller => include_str!("documents/seller.json"),
            BuiltinFlow::Influencer => include_str!("documents/influencer.json"),
            BuiltinFlow::Mua => include_str!("documents/mua.json"),
            BuiltinFlow::WeddingPlanner => include_str!("documents/wedding-planner.json"),
            BuiltinFlow::Stylist => include_str!("documents/stylist.json"),
        }
    }

    pub fn document(self) -> Result<Value> {
        serde_json::from_str(self.document_str())
            .with_context(|| format!("built-in flow '{}' is not valid JSON", self.id()))
    }

    pub fn load(self) -> Result<FlowSchema> {
        parse_flow_schema(&self.document()?)
            .with_context(|| format!("built-in flow '{}' is malformed", self.id()))
    }
}

impl fmt::Display for BuiltinFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for BuiltinFlow {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "seller" => Ok(BuiltinFlow::Seller),
            "influencer" => Ok(BuiltinFlow::Influencer),
            "mua" | "makeup-artist" => Ok(BuiltinFlow::Mua),
            "wedding-planner" => Ok(BuiltinFlow::WeddingPlanner),
            "stylist" => Ok(BuiltinFlow::Stylist),
            _ => bail!(
                "unknown flow '{raw}', expected one of: {}",
                BuiltinFlow::ALL.map(BuiltinFlow::id).join(", ")
            ),
        }
    }
}

/// Resolves a built-in flow id, or else treats `name` as a path to a flow
/// document.
pub fn resolve_flow(name: &str) -> Result<FlowSchema> {
    if let Ok(builtin) = name.parse::<BuiltinFlow>() {
        return builtin.load();
    }
    let path = Path::new(name);
    if !path.exists() {
        bail!(
            "'{name}' is neither a built-in flow ({}) nor an existing file",
            BuiltinFlow::ALL.map(BuiltinFlow::id).join(", ")
        );
    }
    let document = load_document(path)?;
    parse_flow_schema(&document).with_context(|| format!("invalid flow document {name}"))
}
