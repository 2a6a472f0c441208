//! Domain entity schemas for the pets/users API.

use super::types::{Field, FieldType, Schema};

pub const PET_STATUSES: &[&str] = &["available", "pending", "sold"];
pub const USER_STATUSES: &[&str] = &["registered", "active", "closed"];

pub static CATEGORY: Schema = Schema {
    name: "Category",
    fields: &[
        Field::required("id", FieldType::Int),
        Field::required("name", FieldType::Str),
    ],
};

pub static TAG: Schema = Schema {
    name: "Tag",
    fields: &[
        Field::required("id", FieldType::Int),
        Field::required("name", FieldType::Str),
    ],
};

pub static PET: Schema = Schema {
    name: "Pet",
    fields: &[
        Field::required("id", FieldType::Int),
        Field::required("name", FieldType::Str),
        Field::optional("category", FieldType::Entity(&CATEGORY)),
        Field::optional("tags", FieldType::SeqOf(&TAG)),
        Field::optional("status", FieldType::Enum(PET_STATUSES)),
    ],
};

pub static PET_LIST: Schema = Schema {
    name: "PetList",
    fields: &[
        Field::required("total", FieldType::Int),
        Field::required("pets", FieldType::SeqOf(&PET)),
    ],
};

/// Form-encoded partial update; every field optional.
pub static PARTIAL_PET: Schema = Schema {
    name: "PartialPet",
    fields: &[
        Field::optional("name", FieldType::Str),
        Field::optional("status", FieldType::Enum(PET_STATUSES)),
    ],
};

pub static USER: Schema = Schema {
    name: "User",
    fields: &[
        Field::required("username", FieldType::Str),
        Field::required("password", FieldType::Str),
        Field::optional("first-name", FieldType::Str),
        Field::optional("last-name", FieldType::Str),
        Field::optional("status", FieldType::Enum(USER_STATUSES)),
    ],
};

pub static PET_ID: Schema = Schema {
    name: "PetId",
    fields: &[Field::required("id", FieldType::Int)],
};

pub static USERNAME: Schema = Schema {
    name: "Username",
    fields: &[Field::required("username", FieldType::Str)],
};

pub static PET_QUERY: Schema = Schema {
    name: "PetQuery",
    fields: &[Field::optional("status", FieldType::Enum(PET_STATUSES))],
};

/// Every schema referenced by the route table, in documentation order.
pub static ALL: &[&Schema] = &[
    &CATEGORY,
    &TAG,
    &PET,
    &PET_LIST,
    &PARTIAL_PET,
    &USER,
];
