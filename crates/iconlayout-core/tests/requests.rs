use iconlayout_core::{
    solve_layout, FolderOptions, LayoutOptimizer, LayoutRequest, Occupant, PlacementMode,
    SolveStatus,
};

const DEMO: &str = include_str!("../../../demos/home_screen.yaml");

#[test]
fn demo_request_loads_and_validates() {
    let request: LayoutRequest = serde_yaml::from_str(DEMO).unwrap();

    assert_eq!(request.items.len(), 23);
    assert_eq!(request.geometry.slot_count(), 28);
    assert_eq!(request.weight(14), 60.0);
    assert_eq!(request.placement, PlacementMode::ExactlyOne);

    let optimizer = LayoutOptimizer::new(request).unwrap();
    let stats = optimizer.model_stats();
    assert_eq!(stats.placement_vars, 23 * 28);
    assert_eq!(stats.folder_slot_vars, 0);
    assert_eq!(stats.color_pair_vars, 0);
}

#[test]
fn demo_request_with_folders_has_one_folder_per_genre() {
    let mut request: LayoutRequest = serde_yaml::from_str(DEMO).unwrap();
    request.folders = Some(FolderOptions::new(10.0));

    let optimizer = LayoutOptimizer::new(request).unwrap();

    assert_eq!(
        optimizer.folder_keys(),
        ["SNS", "Entertainment", "Work", "Utility", "Finance", "News"]
    );
    // Every item is eligible for exactly one folder
    assert_eq!(optimizer.model_stats().folder_link_vars, 23 * 28);
}

#[test]
fn yaml_request_solves_end_to_end() {
    let yaml = r#"
items:
  - { name: Chat, usage: 9, genre: Social }
  - { name: Forum, usage: 4, genre: Social }
  - { name: Camera, usage: 6 }
weights:
  1: 5
  2: 3
geometry: { rows: 1, cols: 2 }
folders: { penalty: 1 }
"#;
    let request: LayoutRequest = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(request.folders.unwrap().capacity, 9);

    let outcome = solve_layout(request).unwrap();
    let layout = outcome.layout.unwrap();

    assert_eq!(outcome.status, SolveStatus::Optimal);
    // Social folder at the best slot: (5 - 1) * 13 = 52, Camera at slot 2: 18
    assert_eq!(layout.slots[&1], Occupant::Folder("Social".into()));
    assert_eq!(layout.slots[&2], Occupant::Item("Camera".into()));
    assert_eq!(layout.folders["Social"], vec!["Chat", "Forum"]);
    assert!((layout.objective - 70.0).abs() < 1e-6);
}

#[test]
fn json_request_accepts_string_slot_keys() {
    let json = r#"{
        "items": [{ "name": "Mail", "usage": 1 }, { "name": "Chat", "usage": 1 }],
        "weights": { "1": 2.0 },
        "geometry": { "rows": 1, "cols": 1, "dock_size": 0 },
        "placement": "exactly_one"
    }"#;
    let request: LayoutRequest = serde_json::from_str(json).unwrap();

    let outcome = solve_layout(request).unwrap();

    assert_eq!(outcome.status, SolveStatus::Infeasible);
    let body = serde_json::to_value(&outcome).unwrap();
    assert_eq!(body["status"], "Infeasible");
    assert!(body["layout"].is_null());
}
