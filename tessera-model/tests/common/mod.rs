//! Shared model fixtures for marshaling tests.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use tessera_model::coerce::{coerce_enum, enum_to_json, enum_type};
use tessera_model::{Coerce, CoercionFailure, FieldType, Model, NamedEnum, Properties};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Role {
    #[default]
    Member,
    Admin,
}

impl NamedEnum for Role {
    const VARIANTS: &'static [(&'static str, Self)] =
        &[("member", Role::Member), ("admin", Role::Admin)];
}

impl Coerce for Role {
    fn field_type() -> FieldType {
        enum_type::<Self>()
    }

    fn coerce(raw: &Value) -> Result<Self, CoercionFailure> {
        coerce_enum(raw)
    }

    fn to_json(&self) -> Value {
        enum_to_json(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
}

impl Model for Address {
    fn properties(props: &mut Properties<Self>) {
        props.field("street", |a| &a.street, |a| &mut a.street);
        props.field("city", |a| &a.city, |a| &mut a.city);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub age: u32,
    pub active: bool,
    pub score: f64,
    pub role: Role,
    pub birthday: Option<NaiveDate>,
    pub last_login: Option<NaiveDateTime>,
    pub tags: Vec<String>,
    pub address: Option<Address>,
}

impl Model for User {
    fn properties(props: &mut Properties<Self>) {
        props.id("id", |u| &u.id, |u| &mut u.id);
        props.field("name", |u| &u.name, |u| &mut u.name).column("user_name");
        props.field("email", |u| &u.email, |u| &mut u.email);
        props.field("age", |u| &u.age, |u| &mut u.age);
        props.field("active", |u| &u.active, |u| &mut u.active);
        props.field("score", |u| &u.score, |u| &mut u.score);
        props.field("role", |u| &u.role, |u| &mut u.role);
        props.field("birthday", |u| &u.birthday, |u| &mut u.birthday);
        props
            .field("lastLogin", |u| &u.last_login, |u| &mut u.last_login)
            .column("last_login");
        props.field("tags", |u| &u.tags, |u| &mut u.tags);
        props.field("address", |u| &u.address, |u| &mut u.address);
    }
}

/// A model exercising computed, read-only and write-only properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Account {
    pub id: String,
    pub owner: String,
    pub balance_cents: i64,
    pub secret: String,
}

impl Model for Account {
    fn properties(props: &mut Properties<Self>) {
        props.id("id", |a| &a.id, |a| &mut a.id);
        props.field("owner", |a| &a.owner, |a| &mut a.owner);
        props.accessor("balance", balance, set_balance);
        props.read_only("label", |a| format!("{} ({})", a.owner, a.id));
        props.write_only("password", |a, password: String| {
            a.secret = password.chars().rev().collect()
        });
    }
}

fn balance(account: &Account) -> f64 {
    account.balance_cents as f64 / 100.0
}

fn set_balance(account: &mut Account, balance: f64) {
    account.balance_cents = (balance * 100.0).round() as i64;
}

/// A model with no identity property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Setting {
    pub key: String,
    pub value: Value,
}

impl Model for Setting {
    fn model_name() -> &'static str {
        "setting"
    }

    fn properties(props: &mut Properties<Self>) {
        props.field("key", |s| &s.key, |s| &mut s.key);
        props.field("value", |s| &s.value, |s| &mut s.value);
    }
}

/// A team holding nested models in a list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Team {
    pub id: u64,
    pub members: Vec<User>,
}

impl Model for Team {
    fn properties(props: &mut Properties<Self>) {
        props.id("id", |t| &t.id, |t| &mut t.id);
        props.field("members", |t| &t.members, |t| &mut t.members);
    }
}

pub fn alice() -> User {
    User {
        id: 1,
        name: "Alice".to_string(),
        email: Some("alice@example.com".to_string()),
        age: 34,
        active: true,
        score: 97.5,
        role: Role::Admin,
        birthday: NaiveDate::from_ymd_opt(1990, 4, 12),
        last_login: NaiveDate::from_ymd_opt(2024, 1, 2).and_then(|d| d.and_hms_opt(3, 4, 5)),
        tags: vec!["staff".to_string(), "ops".to_string()],
        address: Some(Address {
            street: "1 Main St".to_string(),
            city: "Springfield".to_string(),
        }),
    }
}

pub fn bob() -> User {
    User {
        id: 2,
        name: "Bob".to_string(),
        age: 27,
        ..User::default()
    }
}
