use profsync_core::TagLabels;

use super::*;

fn record(nickname: &str) -> ProfileRecord {
    ProfileRecord {
        datetime: "10-Jan-24 03:00 PM".to_owned(),
        nickname: nickname.to_owned(),
        city: "Lahore".to_owned(),
        gender: "Male".to_owned(),
        age: "29".to_owned(),
        followers: "120".to_owned(),
        posts: "14".to_owned(),
        last_post_at: "10-Jan-24 01:00 PM".to_owned(),
        profile_link: format!("https://example.pk/users/{nickname}/"),
        intro: "hello".to_owned(),
        ..ProfileRecord::default()
    }
}

fn tags_with(rows: &[&[&str]]) -> TagIndex {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|r| r.iter().map(|c| (*c).to_owned()).collect())
        .collect();
    TagIndex::from_rows(&rows, &TagLabels::default())
}

/// A sheet holding exactly `stored`, projected through layout A.
fn index_of(stored: &[ProfileRecord]) -> RowIndex {
    let mut rows = vec![SheetLayout::A.header()];
    rows.extend(stored.iter().map(|r| SheetLayout::A.project(r)));
    RowIndex::from_rows(&rows, SheetLayout::A)
}

fn full(record: &mut ProfileRecord, rows: &RowIndex, tags: &TagIndex) -> Decision {
    reconcile(record, rows, tags, SheetLayout::A, UpdateMode::FullRow)
}

#[test]
fn empty_identifier_is_skipped() {
    let mut rec = record("  ");
    assert_eq!(full(&mut rec, &RowIndex::default(), &TagIndex::default()), Decision::Skip);
}

#[test]
fn unknown_identifier_creates_projected_row_with_tags() {
    let tags = tags_with(&[&["Following", "VIP"], &["ali", "ali"]]);
    let mut rec = record("ali");
    let Decision::Create(values) = full(&mut rec, &RowIndex::default(), &tags) else {
        panic!("expected create");
    };
    assert_eq!(values.len(), 15);
    assert_eq!(values[1], "ali");
    assert_eq!(values[2], "🔗 Following, 📌 VIP");
    assert_eq!(rec.tags, "🔗 Following, 📌 VIP");
}

#[test]
fn identical_record_is_noop_every_time() {
    let stored = record("ali");
    let rows = index_of(&[stored.clone()]);
    let tags = TagIndex::default();
    for _ in 0..2 {
        let mut rec = stored.clone();
        assert_eq!(full(&mut rec, &rows, &tags), Decision::NoOp);
    }
}

#[test]
fn new_observation_time_alone_is_noop() {
    let rows = index_of(&[record("ali")]);
    let mut rec = record("ali");
    rec.datetime = "11-Jan-24 09:00 AM".to_owned();
    assert_eq!(full(&mut rec, &rows, &TagIndex::default()), Decision::NoOp);
}

#[test]
fn whitespace_differences_are_not_changes() {
    let rows = index_of(&[record("ali")]);
    let mut rec = record("ali");
    rec.followers = " 120 ".to_owned();
    assert_eq!(full(&mut rec, &rows, &TagIndex::default()), Decision::NoOp);
}

#[test]
fn empty_incoming_value_never_erases_stored_value() {
    let rows = index_of(&[record("ali")]);
    let mut rec = record("ali");
    rec.city.clear();
    rec.intro.clear();
    assert_eq!(full(&mut rec, &rows, &TagIndex::default()), Decision::NoOp);
}

#[test]
fn numeric_looking_values_compare_as_strings() {
    let mut stored = record("ali");
    stored.posts = "5".to_owned();
    let rows = index_of(&[stored]);
    let mut rec = record("ali");
    rec.posts = "05".to_owned();
    let Decision::Update(update) = full(&mut rec, &rows, &TagIndex::default()) else {
        panic!("expected update");
    };
    assert_eq!(update.changed_columns, vec![9]);
}

#[test]
fn full_row_update_merges_with_monotonic_fill() {
    let rows = index_of(&[record("sana"), record("ali")]);
    let mut rec = record("ali");
    rec.datetime = "11-Jan-24 09:00 AM".to_owned();
    rec.followers = "150".to_owned();
    rec.city.clear();

    let Decision::Update(update) = full(&mut rec, &rows, &TagIndex::default()) else {
        panic!("expected update");
    };
    assert_eq!(update.position, 3);
    assert_eq!(update.changed_columns, vec![8]);
    assert!(!update.tags_changed);
    let UpdatePayload::Row(values) = &update.payload else {
        panic!("expected full row");
    };
    assert_eq!(values[0], "11-Jan-24 09:00 AM");
    assert_eq!(values[3], "Lahore", "empty city keeps stored value");
    assert_eq!(values[8], "150");
    assert_eq!(values, &update.merged);
}

#[test]
fn tags_only_change_is_an_update() {
    let rows = index_of(&[record("ali")]);
    let tags = tags_with(&[&["Bookmark"], &["ali"]]);
    let mut rec = record("ali");
    let Decision::Update(update) = full(&mut rec, &rows, &tags) else {
        panic!("expected update");
    };
    assert!(update.changed_columns.is_empty());
    assert!(update.tags_changed);
    assert_eq!(update.merged[2], "📖 Bookmark");
}

#[test]
fn removed_tags_are_written_as_empty() {
    let mut stored = record("ali");
    stored.tags = "📖 Bookmark".to_owned();
    let rows = index_of(&[stored]);
    let mut rec = record("ali");
    let Decision::Update(update) = full(&mut rec, &rows, &TagIndex::default()) else {
        panic!("expected update");
    };
    assert_eq!(update.merged[2], "");
}

#[test]
fn short_stored_row_is_padded_before_comparison() {
    let rows = RowIndex::from_rows(
        &[
            SheetLayout::A.header(),
            vec!["10-Jan-24 03:00 PM".to_owned(), "ali".to_owned()],
        ],
        SheetLayout::A,
    );
    let mut rec = record("ali");
    let Decision::Update(update) = full(&mut rec, &rows, &TagIndex::default()) else {
        panic!("expected update");
    };
    assert_eq!(update.merged.len(), 15);
    assert_eq!(update.changed_columns, vec![3, 4, 6, 8, 9, 11, 14]);
}

#[test]
fn cell_patch_touches_timestamp_and_changed_cells_only() {
    let rows = index_of(&[record("ali")]);
    let tags = tags_with(&[&["Following"], &["ali"]]);
    let mut rec = record("ali");
    rec.datetime = "11-Jan-24 09:00 AM".to_owned();
    rec.age = "30".to_owned();

    let decision = reconcile(&mut rec, &rows, &tags, SheetLayout::A, UpdateMode::CellPatch);
    let Decision::Update(update) = decision else {
        panic!("expected update");
    };
    let UpdatePayload::Cells(patches) = &update.payload else {
        panic!("expected cell patches");
    };
    assert_eq!(
        patches,
        &vec![
            CellPatch {
                column: 0,
                value: "11-Jan-24 09:00 AM".to_owned(),
                highlight: false,
            },
            CellPatch {
                column: 2,
                value: "🔗 Following".to_owned(),
                highlight: true,
            },
            CellPatch {
                column: 6,
                value: "30".to_owned(),
                highlight: true,
            },
        ]
    );
    assert_eq!(update.merged[6], "30");
    assert_eq!(update.merged[3], "Lahore");
}

#[test]
fn cell_patch_layout_b_rewrites_date_and_time() {
    let stored = record("ali");
    let rows = RowIndex::from_rows(
        &[SheetLayout::B.header(), SheetLayout::B.project(&stored)],
        SheetLayout::B,
    );
    let mut rec = record("ali");
    rec.datetime = "11-Jan-24 09:00 AM".to_owned();
    rec.posts = "15".to_owned();

    let decision = reconcile(&mut rec, &rows, &TagIndex::default(), SheetLayout::B, UpdateMode::CellPatch);
    let Decision::Update(update) = decision else {
        panic!("expected update");
    };
    let UpdatePayload::Cells(patches) = &update.payload else {
        panic!("expected cell patches");
    };
    let columns: Vec<usize> = patches.iter().map(|p| p.column).collect();
    assert_eq!(columns, vec![0, 1, 10]);
    assert_eq!(patches[0].value, "11-Jan-24");
    assert_eq!(patches[1].value, "09:00 AM");
}

#[test]
fn layout_b_ignores_post_columns() {
    let stored = record("ali");
    let rows = RowIndex::from_rows(
        &[SheetLayout::B.header(), SheetLayout::B.project(&stored)],
        SheetLayout::B,
    );
    let mut rec = record("ali");
    rec.last_post_at = "11-Jan-24 08:00 AM".to_owned();
    rec.last_post = "https://example.pk/content/9/g/".to_owned();
    let decision = reconcile(&mut rec, &rows, &TagIndex::default(), SheetLayout::B, UpdateMode::FullRow);
    assert_eq!(decision, Decision::NoOp);
}

#[test]
fn cell_patch_keeps_stored_timestamp_when_incoming_is_empty() {
    let rows = index_of(&[record("ali")]);
    let mut rec = record("ali");
    rec.datetime = String::new();
    rec.city = "Karachi".to_owned();

    let decision = reconcile(&mut rec, &rows, &TagIndex::default(), SheetLayout::A, UpdateMode::CellPatch);
    let Decision::Update(update) = decision else {
        panic!("expected update");
    };
    let UpdatePayload::Cells(patches) = &update.payload else {
        panic!("expected cell patches");
    };
    let columns: Vec<usize> = patches.iter().map(|p| p.column).collect();
    assert_eq!(columns, vec![3]);
    assert_eq!(update.merged[0], "10-Jan-24 03:00 PM");
    assert_eq!(update.merged[3], "Karachi");
}
