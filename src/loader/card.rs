//! Card file loader (.txt format)
//!
//! A card is a block of `Key:Value` lines:
//!
//! ```text
//! ID:#F10
//! Name:Controlled Burn
//! AP:2
//! Money:1
//! Keywords:Bushfire,Operation
//! Description:Burn off undergrowth before the season.
//! Effects:Happiness:-1 | (B) FirefightingEquipment:-X
//! TileEffects:(P) FuelDelta(-1,0,-1,2)
//! ```
//!
//! `Effects` and `TileEffects` hold `|`-separated segments. A segment may start
//! with a gate, `(P)`, `(B)` or `(1)`..`(6)`; ungated segments always apply.
//! Effects inside a segment are separated by `;`.

use crate::core::{
    CardCode, CardDefinition, EffectBlock, Gate, Keyword, Phase, ResourceEffect, ResourceKind,
    TargetScope, TileEffect, TileEffectKind, TileType,
};
use crate::{EngineError, Result};
use smallvec::SmallVec;
use std::fs;
use std::path::Path;

/// Card loader for .txt files
pub struct CardLoader;

impl CardLoader {
    /// Load a single card from a .txt file
    pub fn load_from_file(path: &Path) -> Result<CardDefinition> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse every card in a file; cards are separated by blank lines and
    /// blocks holding only `#` comments are skipped
    pub fn parse_many(content: &str) -> Result<Vec<CardDefinition>> {
        let mut cards = Vec::new();
        let mut block = String::new();
        let mut has_fields = false;
        for line in content.lines().chain(std::iter::once("")) {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                if has_fields {
                    cards.push(Self::parse(&block)?);
                }
                block.clear();
                has_fields = false;
            } else {
                has_fields |= !trimmed.starts_with('#');
                block.push_str(line);
                block.push('\n');
            }
        }
        Ok(cards)
    }

    /// Parse one card from its text content
    pub fn parse(content: &str) -> Result<CardDefinition> {
        let mut code = None;
        let mut name = None;
        let mut description = String::new();
        let mut action_points = 0;
        let mut money_cost = 0;
        let mut keywords: SmallVec<[Keyword; 2]> = SmallVec::new();
        let mut resource_blocks = Vec::new();
        let mut tile_blocks = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();

            match key.trim() {
                "ID" => {
                    code = Some(CardCode::parse(value).ok_or_else(|| {
                        EngineError::InvalidCardFormat(format!("Bad card ID '{value}'"))
                    })?)
                }
                "Name" => name = Some(value.to_string()),
                "Description" | "Desc" => description = value.to_string(),
                "AP" => action_points = parse_cost("AP", value)?,
                "Money" => money_cost = parse_cost("Money", value)?,
                "Keywords" => {
                    for part in value.split(',').filter(|p| !p.trim().is_empty()) {
                        let keyword: Keyword = part.parse()?;
                        if !keywords.contains(&keyword) {
                            keywords.push(keyword);
                        }
                    }
                }
                "Effects" => resource_blocks = parse_blocks(value, parse_resource_effect)?,
                "TileEffects" => tile_blocks = parse_blocks(value, parse_tile_effect)?,
                _ => {} // Unknown fields are ignored
            }
        }

        let code = code.ok_or(EngineError::InvalidCardFormat("Missing card ID".to_string()))?;
        let name = name.ok_or_else(|| {
            EngineError::InvalidCardFormat(format!("Card {code} is missing a name"))
        })?;

        let mut card = CardDefinition::new(code, name);
        card.description = description;
        card.action_points = action_points;
        card.money_cost = money_cost;
        card.keywords = keywords;
        card.resource_blocks = resource_blocks;
        card.tile_blocks = tile_blocks;
        Ok(card)
    }
}

fn parse_cost(field: &str, value: &str) -> Result<u32> {
    value
        .parse()
        .map_err(|_| EngineError::InvalidCardFormat(format!("{field} must be a whole number, got '{value}'")))
}

/// Split `value` into gated segments and parse each effect with `parse_one`
fn parse_blocks<E>(value: &str, parse_one: fn(&str) -> Result<E>) -> Result<Vec<EffectBlock<E>>> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        return Ok(Vec::new());
    }

    let mut blocks = Vec::new();
    for segment in value.split('|') {
        let (gate, body) = split_gate(segment.trim())?;
        let effects = body
            .split(';')
            .map(str::trim)
            .filter(|e| !e.is_empty() && !e.eq_ignore_ascii_case("none"))
            .map(parse_one)
            .collect::<Result<Vec<_>>>()?;
        blocks.push(EffectBlock::new(gate, effects));
    }
    Ok(blocks)
}

/// Peel an optional `(P)`, `(B)` or `(n)` prefix off a segment
fn split_gate(segment: &str) -> Result<(Gate, &str)> {
    let Some(rest) = segment.strip_prefix('(') else {
        return Ok((Gate::Base, segment));
    };
    let Some((inner, body)) = rest.split_once(')') else {
        return Err(EngineError::InvalidCardFormat(format!(
            "Unclosed gate in '{segment}'"
        )));
    };
    let inner = inner.trim();
    if let Some(phase) = Phase::from_letter(inner) {
        return Ok((Gate::Phase(phase), body));
    }
    match inner.parse::<u8>() {
        Ok(n) if (1..=6).contains(&n) => Ok((Gate::Outcome(n), body)),
        _ => Err(EngineError::InvalidCardFormat(format!(
            "Unknown gate '({inner})'; expected (P), (B) or (1)..(6)"
        ))),
    }
}

/// `Resource:+2`, `Resource:-1`, `Resource:X`, `Resource:-X`, `Resource:2X`
fn parse_resource_effect(text: &str) -> Result<ResourceEffect> {
    let (name, amount) = text.split_once(':').ok_or_else(|| {
        EngineError::InvalidCardFormat(format!("Resource effect '{text}' needs 'Name:amount'"))
    })?;
    let resource: ResourceKind = name.parse()?;
    let amount = amount.trim();

    if let Some(prefix) = amount
        .strip_suffix('X')
        .or_else(|| amount.strip_suffix('x'))
    {
        let multiplier = match prefix.trim() {
            "" | "+" => 1,
            "-" => -1,
            n => n.parse().map_err(|_| {
                EngineError::InvalidCardFormat(format!("Bad X multiplier in '{text}'"))
            })?,
        };
        return Ok(ResourceEffect::per_input(resource, multiplier));
    }

    let fixed = amount
        .parse()
        .map_err(|_| EngineError::InvalidCardFormat(format!("Bad amount in '{text}'")))?;
    Ok(ResourceEffect::fixed(resource, fixed))
}

/// `Kind(v,s,t,d)` with an optional `@Tile`, `@Global` or `@<TileType>` scope
fn parse_tile_effect(text: &str) -> Result<TileEffect> {
    let (body, scope) = match text.split_once('@') {
        Some((body, scope)) => (body.trim(), parse_scope(scope.trim())?),
        None => (text.trim(), TargetScope::Tile),
    };

    let (name, args) = body
        .strip_suffix(')')
        .and_then(|b| b.split_once('('))
        .ok_or_else(|| {
            EngineError::InvalidCardFormat(format!("Tile effect '{text}' needs 'Kind(v,s,t,d)'"))
        })?;
    let kind: TileEffectKind = name.parse()?;

    let mut values = [0i32; 4];
    let parts: Vec<&str> = args.split(',').map(str::trim).filter(|a| !a.is_empty()).collect();
    if parts.len() > values.len() {
        return Err(EngineError::InvalidCardFormat(format!(
            "Tile effect '{text}' takes at most 4 arguments"
        )));
    }
    for (slot, part) in values.iter_mut().zip(parts) {
        *slot = part.parse().map_err(|_| {
            EngineError::InvalidCardFormat(format!("Bad argument '{part}' in '{text}'"))
        })?;
    }
    let [v, s, t, d] = values;
    Ok(TileEffect::new(kind, v, s, t, d).with_scope(scope))
}

fn parse_scope(scope: &str) -> Result<TargetScope> {
    match scope.to_ascii_lowercase().as_str() {
        "tile" => Ok(TargetScope::Tile),
        "global" | "all" => Ok(TargetScope::Global),
        _ => Ok(TargetScope::Class(scope.parse::<TileType>()?)),
    }
}
