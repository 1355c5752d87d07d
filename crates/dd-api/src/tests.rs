use super::*;
use dd_core::{Action, PropertyValue};

const SCRIPT: &str = r#"instance PAL_200_Hagen (Npc_Default)
{
	name = "Lord Hagen";
	guild = GIL_PAL;
};

instance DIA_Hagen_Hallo (C_INFO)
{
	npc			= PAL_200_Hagen;
	nr			= 2;
	condition	= DIA_Hagen_Hallo_Condition;
	information	= DIA_Hagen_Hallo_Info;
	permanent	= TRUE;
	description	= "Who are you?";
};

func int DIA_Hagen_Hallo_Condition()
{
	if (Kapitel >= 2)
	{
		return TRUE;
	};
};

func void DIA_Hagen_Hallo_Info()
{
	AI_Output (other, self, "DIA_Hagen_Hallo_15_00"); //Who are you?
	AI_Output (self, other, "DIA_Hagen_Hallo_04_01"); //Lord Hagen.
	AI_Output (self, other, "DIA_Hagen_Hallo_04_02"); //Now leave.
	Info_AddChoice (DIA_Hagen_Hallo, "Bye", DIA_Hagen_Hallo_Bye);
	B_GivePlayerXP (XP_Ambient);
};

instance DIA_Hagen_Lost (C_INFO)
{
	condition	= DIA_Hagen_Missing;
	description	= "...";
};
"#;

#[test]
fn json_round_trip_preserves_the_model() {
    let model = parse_semantic_model(SCRIPT);
    let json = model_to_json(&model, true).expect("model should encode");
    let restored = model_from_json(&json).expect("model should decode");
    assert_eq!(restored, model);
    let dialog = restored.dialog("DIA_Hagen_Hallo").expect("dialog should exist");
    assert!(matches!(
        dialog.properties.get("condition"),
        Some(PropertyValue::Function { .. })
    ));
}

#[test]
fn invalid_json_is_reported() {
    let error = model_from_json("{\"dialogs\": 3}").expect_err("json should be rejected");
    assert_eq!(error.code, "MODEL_JSON_INVALID");
}

#[test]
fn dialog_extraction_inlines_linked_functions() {
    let model = parse_semantic_model(SCRIPT);
    let view = extract_dialog(&model, "DIA_Hagen_Hallo").expect("dialog should extract");
    assert_eq!(view.npc.as_deref(), Some("PAL_200_Hagen"));
    assert_eq!(view.nr, Some(2.0));
    assert_eq!(view.permanent, Some(true));
    assert_eq!(view.description.as_deref(), Some("Who are you?"));
    let condition = view.condition.expect("condition should be inlined");
    assert_eq!(condition.name, "DIA_Hagen_Hallo_Condition");
    assert_eq!(condition.conditions.len(), 1);
    let information = view.information.expect("information should be inlined");
    assert_eq!(information.actions.len(), 5);
    assert!(view
        .properties
        .iter()
        .any(|property| property.key == "information" && property.value == "DIA_Hagen_Hallo_Info"));

    let json = to_json(&extract_dialog(&model, "DIA_Hagen_Hallo").expect("dialog"), false)
        .expect("view should encode");
    assert!(json.contains("\"information\":{\"name\":\"DIA_Hagen_Hallo_Info\""));

    let error = extract_dialog(&model, "DIA_Nobody").expect_err("unknown dialog should fail");
    assert_eq!(error.code, "API_DIALOG_NOT_FOUND");
    assert!(error.message.contains("DIA_Hagen_Hallo"));
}

#[test]
fn npc_extraction_collects_dialogs() {
    let model = parse_semantic_model(SCRIPT);
    let npc = extract_npc(&model, "pal_200_hagen").expect("npc should extract");
    assert_eq!(npc.name, "PAL_200_Hagen");
    assert_eq!(npc.display_name.as_deref(), Some("Lord Hagen"));
    assert_eq!(npc.dialogs.len(), 1);
    let error = extract_npc(&model, "VLK_1_Nobody").expect_err("unknown npc should fail");
    assert_eq!(error.code, "API_NPC_NOT_FOUND");
}

#[test]
fn summaries_count_lines_and_choices() {
    let model = parse_semantic_model(SCRIPT);
    let summaries = dialog_summaries(&model);
    let hallo = summaries
        .iter()
        .find(|summary| summary.name == "DIA_Hagen_Hallo")
        .expect("summary should exist");
    assert_eq!(hallo.lines, 3);
    assert_eq!(hallo.choices, 1);
    assert!(hallo.has_actions);
    assert_eq!(hallo.preview.len(), 2);
    assert_eq!(hallo.preview[0].speaker, "Player");
    assert_eq!(hallo.preview[1].speaker, "PAL_200_Hagen");
    assert_eq!(hallo.preview[1].text, "Lord Hagen.");
    assert_eq!(
        hallo.condition.as_deref(),
        Some("[Variable: Kapitel >= 2]")
    );

    let npcs = npc_summaries(&model);
    assert_eq!(npcs.len(), 1);
    assert_eq!(npcs[0].dialog_count, 1);

    let summary = parse_summary(&model);
    assert_eq!(summary.npcs, 1);
    assert_eq!(summary.dialogs, 2);
    assert_eq!(summary.dialog_npcs, vec!["PAL_200_Hagen"]);
    assert_eq!(summary.related_functions, 2);
}

#[test]
fn validation_reports_missing_and_unresolved_links() {
    let model = parse_semantic_model(SCRIPT);
    let warnings = validate_model(&model);
    let codes: Vec<&str> = warnings
        .iter()
        .filter(|warning| warning.dialog == "DIA_Hagen_Lost")
        .map(|warning| warning.code.as_str())
        .collect();
    assert_eq!(
        codes,
        vec![
            "DIALOG_MISSING_NPC",
            "DIALOG_UNRESOLVED_CONDITION",
            "DIALOG_MISSING_INFORMATION"
        ]
    );
    assert!(warnings
        .iter()
        .all(|warning| warning.dialog != "DIA_Hagen_Hallo"));
}

#[test]
fn round_trip_is_clean_for_default_options() {
    let model = parse_semantic_model(SCRIPT);
    let report = round_trip(&model, &GeneratorOptions::default());
    assert!(report.is_clean(), "differences: {:?}", report.differences);
    assert!(report.generated.contains("instance PAL_200_Hagen (Npc_Default)"));
}

#[test]
fn edited_models_round_trip_with_their_edits() {
    let mut model = parse_semantic_model(SCRIPT);
    let before = summarize_model(&model);
    if let Some(function) = model.functions.by_name_mut("DIA_Hagen_Hallo_Info") {
        function.actions.push(Action::raw("B_GivePlayerXP (XP_Ambient)"));
    }
    assert_ne!(summarize_model(&model), before);
    let report = round_trip(&model, &GeneratorOptions::default());
    assert!(report.is_clean());
    assert!(report.generated.matches("B_GivePlayerXP (XP_Ambient);").count() == 2);
}

const RAW_CONDITION_SCRIPT: &str = r#"instance DIA_Hagen_Pass (C_INFO)
{
	npc			= PAL_200_Hagen;
	condition	= DIA_Hagen_Pass_Condition;
	information	= DIA_Hagen_Pass_Info;
};

func int DIA_Hagen_Pass_Condition()
{
	if (Npc_KnowsInfo (other, DIA_Hagen_Hallo))
	{
		// passed the guards
		return TRUE;
	}
	else
	{
		return FALSE;
	};
};

func void DIA_Hagen_Pass_Info()
{
	AI_Output (self, other, "DIA_Hagen_Pass_04_00"); //Go ahead.
};
"#;

#[test]
fn raw_condition_bodies_survive_generate_and_reparse() {
    let options = GeneratorOptions::default();
    let model = parse_semantic_model(RAW_CONDITION_SCRIPT);
    assert!(!model.has_errors);
    assert!(model
        .function("DIA_Hagen_Pass_Condition")
        .expect("condition should exist")
        .raw);

    let first = generate_source(&model, &options);
    let reparsed = parse_semantic_model(&first);
    assert!(!reparsed.has_errors, "errors: {:?}", reparsed.errors);
    let condition = reparsed
        .function("DIA_Hagen_Pass_Condition")
        .expect("condition should survive regeneration");
    assert!(condition.raw);
    assert!(condition.conditions.is_empty());
    assert!(condition.actions.iter().any(|action| action
        .raw_text()
        .map(|text| text.contains("else") && text.contains("// passed the guards"))
        .unwrap_or(false)));

    let second = generate_source(&reparsed, &options);
    let third = generate_source(&parse_semantic_model(&second), &options);
    assert_eq!(second, third);
    assert_eq!(first, second);

    let report = round_trip(&model, &options);
    assert!(report.is_clean(), "differences: {:?}", report.differences);
}
