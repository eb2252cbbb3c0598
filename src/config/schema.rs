use serde_json::{json, Value};
use std::sync::LazyLock;

pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "default_branch": { "type": "string", "minLength": 1 },
            "environments": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "dev": { "$ref": "#/$defs/profile" },
                    "staging": { "$ref": "#/$defs/profile" },
                    "prod": { "$ref": "#/$defs/profile" }
                }
            },
            "scan": {
                "type": "object",
                "properties": {
                    "required_tools": {
                        "type": "array",
                        "items": { "type": "string", "enum": ["tfsec", "checkov"] },
                        "uniqueItems": true
                    }
                }
            },
            "cost": {
                "type": "object",
                "properties": {
                    "severe_overage_pct": { "$ref": "#/$defs/amount" },
                    "components": {
                        "type": "array",
                        "items": { "$ref": "#/$defs/component" }
                    }
                }
            },
            "policy": {
                "type": "object",
                "properties": {
                    "include_defaults": { "type": "boolean" },
                    "rules": { "type": "array", "items": { "$ref": "#/$defs/rule" } }
                }
            }
        },
        "$defs": {
            "amount": {
                "oneOf": [
                    { "type": "number", "minimum": 0 },
                    { "type": "string", "pattern": "^\\s*\\$?\\s*[0-9]+(\\.[0-9]+)?\\s*$" }
                ]
            },
            "profile": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "budget_limit": { "$ref": "#/$defs/amount" },
                    "scan_policy": { "type": "string", "enum": ["block_high_critical", "warn_only"] },
                    "enforcement": { "type": "string", "enum": ["inform", "warn", "block"] },
                    "rate_limit": { "type": "integer", "minimum": 1 },
                    "replication_enabled": { "type": "boolean" },
                    "fail_fast": { "type": "boolean" }
                }
            },
            "component": {
                "type": "object",
                "required": ["component", "monthly_cost"],
                "properties": {
                    "component": { "type": "string", "minLength": 1 },
                    "monthly_cost": { "$ref": "#/$defs/amount" },
                    "replication": { "type": "boolean" },
                    "overrides": {
                        "type": "object",
                        "additionalProperties": false,
                        "properties": {
                            "dev": { "$ref": "#/$defs/amount" },
                            "staging": { "$ref": "#/$defs/amount" },
                            "prod": { "$ref": "#/$defs/amount" }
                        }
                    }
                }
            },
            "rule": {
                "type": "object",
                "required": ["rule_id", "severity", "predicate"],
                "properties": {
                    "rule_id": { "type": "string", "minLength": 1 },
                    "description": { "type": "string" },
                    "severity": { "type": "string", "enum": ["deny", "warn"] },
                    "predicate": { "type": "object", "required": ["op"] }
                }
            }
        }
    })
});
