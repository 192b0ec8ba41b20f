#![allow(dead_code)]

use survey_model::{Document, Group, GroupId, Item, ItemId, Levels};

pub fn likert(id: &str) -> Item {
    Item::new(ItemId::new(id).unwrap(), id.to_uppercase())
        .with_description(format!("Question {id}"))
        .with_levels(Levels::from_pairs([("1", "Low"), ("2", "High")]))
}

pub fn yes_no(id: &str) -> Item {
    Item::new(ItemId::new(id).unwrap(), id.to_uppercase())
        .with_levels(Levels::from_pairs([("0", "No"), ("1", "Yes")]))
}

pub fn numeric(id: &str) -> Item {
    Item::new(ItemId::new(id).unwrap(), id.to_uppercase()).with_input_type("numerical")
}

pub fn group(id: &str, items: Vec<Item>) -> Group {
    Group::new(GroupId::new(id).unwrap(), id.to_uppercase()).with_items(items)
}

pub fn document(groups: Vec<Group>) -> Document {
    let mut document = Document::new(groups);
    document.survey.title = "Study".to_string();
    document
}

pub fn gid(id: &str) -> GroupId {
    GroupId::new(id).unwrap()
}

pub fn iid(id: &str) -> ItemId {
    ItemId::new(id).unwrap()
}

pub fn record_ids(record: &survey_model::MatrixGroupRecord) -> Vec<&str> {
    record.item_ids.iter().map(ItemId::as_str).collect()
}
