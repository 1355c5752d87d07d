use super::*;
use dd_core::{Action, Condition, DeclarationKind, PrimitiveValue, PropertyValue, SemanticModel};

const DIALOG_SCRIPT: &str = "instance DIA_X(C_INFO){npc=NPC_A;nr=1;condition=DIA_X_Cond;information=DIA_X_Info;};func int DIA_X_Cond(){if(Npc_KnowsInfo(other,DIA_X)){return TRUE;};return FALSE;};func void DIA_X_Info(){AI_Output(self,other,\"DIA_X_15_00\");//Hi\nInfo_AddChoice(DIA_X,\"Bye\",DIA_X_Info);}";

fn model_of(source: &str) -> SemanticModel {
    let model = parse_semantic_model(source);
    assert!(!model.has_errors, "unexpected syntax errors: {:?}", model.errors);
    model
}

#[test]
fn dialog_links_condition_and_information_functions() {
    let model = model_of(DIALOG_SCRIPT);
    let dialog = model.dialog("DIA_X").expect("dialog should exist");

    let condition = model
        .linked_function(dialog, "condition")
        .expect("condition should link");
    assert_eq!(condition.name, "DIA_X_Cond");
    assert!(!condition.raw);
    assert!(condition.style.explicit_false_return);
    assert_eq!(
        condition.conditions,
        vec![Condition::NpcKnowsInfo {
            npc: "other".to_string(),
            dialog_ref: "DIA_X".to_string(),
            negated: false,
        }]
    );

    let information = model
        .linked_function(dialog, "information")
        .expect("information should link");
    assert_eq!(
        information.actions,
        vec![
            Action::DialogLine {
                speaker: "self".to_string(),
                listener: "other".to_string(),
                text: "Hi".to_string(),
                id: "DIA_X_15_00".to_string(),
                inline_comment: true,
            },
            Action::Choice {
                dialog_ref: "DIA_X".to_string(),
                text: "Bye".to_string(),
                target_function: "DIA_X_Info".to_string(),
                text_is_expression: false,
            },
        ]
    );
    assert_eq!(dialog.actions, information.actions);
    assert_eq!(
        dialog.properties.get("npc"),
        Some(&PropertyValue::string("NPC_A"))
    );
    assert_eq!(dialog.properties.get("nr"), Some(&PropertyValue::number(1.0)));
    assert_eq!(
        dialog.properties.keys().collect::<Vec<_>>(),
        vec!["npc", "nr", "condition", "information"]
    );
}

#[test]
fn forward_references_resolve_in_either_order() {
    let source = "func int DIA_Y_Cond() { return TRUE; };\n\
                  func void DIA_Y_Info() { AI_StopProcessInfos (self); };\n\
                  instance DIA_Y (C_INFO) { condition = DIA_Y_Cond; information = dia_y_info; };\n";
    let model = model_of(source);
    let dialog = model.dialog("DIA_Y").expect("dialog should exist");
    assert_eq!(
        model.linked_function(dialog, "information").map(|f| f.name.as_str()),
        Some("DIA_Y_Info")
    );
    assert_eq!(dialog.actions.len(), 1);
    let condition = model.function("DIA_Y_Cond").expect("condition should exist");
    assert!(!condition.raw);
    assert!(condition.conditions.is_empty());
}

#[test]
fn unresolved_references_stay_plain_expressions() {
    let model = model_of("instance DIA_Z (C_INFO) { condition = DIA_Missing; description = \"Go\"; };");
    let dialog = model.dialog("DIA_Z").expect("dialog should exist");
    assert_eq!(
        dialog.properties.get("condition"),
        Some(&PropertyValue::string("DIA_Missing"))
    );
    assert!(dialog.formatting.expression_keys.contains("condition"));
    assert!(dialog.formatting.string_literal_keys.contains("description"));
}

#[test]
fn unsupported_control_flow_preserves_the_whole_body() {
    let source = "instance DIA_R (C_INFO) { condition = DIA_R_Cond; };\n\
                  func int DIA_R_Cond()\n\
                  {\n\
                  \tif (Kapitel >= 2)\n\
                  \t{\n\
                  \t\treturn TRUE;\n\
                  \t};\n\
                  \tif (MIS_Done)\n\
                  \t{\n\
                  \t\treturn TRUE;\n\
                  \t}\n\
                  \telse\n\
                  \t{\n\
                  \t\treturn FALSE;\n\
                  \t};\n\
                  };\n";
    let model = model_of(source);
    let function = model.function("DIA_R_Cond").expect("function should exist");
    assert!(function.raw);
    assert!(function.conditions.is_empty());
    assert_eq!(function.actions.len(), 2);
    assert_eq!(
        function.actions[0],
        Action::raw("if (Kapitel >= 2)\n{\n\treturn TRUE;\n};")
    );
    assert!(function.actions[1]
        .raw_text()
        .map(|text| text.starts_with("if (MIS_Done)") && text.contains("else"))
        .unwrap_or(false));
}

#[test]
fn statements_after_the_canonical_shape_switch_to_raw() {
    let source = "instance DIA_S (C_INFO) { condition = DIA_S_Cond; };\n\
                  func int DIA_S_Cond() { if (A) { return TRUE; }; B = 1; return FALSE; };\n";
    let model = model_of(source);
    let function = model.function("DIA_S_Cond").expect("function should exist");
    assert!(function.raw);
    assert!(!function.style.explicit_false_return);
    assert_eq!(
        function.actions,
        vec![
            Action::raw("if (A) { return TRUE; };"),
            Action::raw("B = 1;"),
            Action::raw("return FALSE;"),
        ]
    );
}

#[test]
fn functions_not_used_as_conditions_are_classified_as_actions() {
    let source = "func void B_Reward()\n{\n\tB_GiveInvItems (self, other, ItMi_Gold, 50);\n\tMIS_Reward = LOG_SUCCESS;\n\tif (Kapitel == 2) { Wld_InsertNpc (Wolf, \"FP\"); };\n};\n";
    let model = model_of(source);
    let function = model.function("B_Reward").expect("function should exist");
    assert_eq!(function.actions.len(), 3);
    assert_eq!(function.actions[0].type_name(), "GiveInventoryItems");
    assert_eq!(
        function.actions[1],
        Action::SetVariable {
            variable_name: "MIS_Reward".to_string(),
            operator: "=".to_string(),
            value: "LOG_SUCCESS".to_string(),
        }
    );
    assert!(function.actions[2].is_raw());
    assert_eq!(function.calls, vec!["B_GiveInvItems", "Wld_InsertNpc"]);
}

#[test]
fn standalone_body_comments_are_kept_in_order() {
    let source = "instance DIA_A_Hallo (C_INFO) { information = DIA_A_Hallo_Info; };\n\
                  func void DIA_A_Hallo_Info()\n\
                  {\n\
                  \tAI_Output (other, self, \"DIA_A_Hallo_15_00\"); //Hello\n\
                  \t//AI_Output (self, other, \"DIA_A_Hallo_01_01\"); //commented out line\n\
                  \tB_GivePlayerXP (XP_Ambient); /* reward */\n\
                  };\n";
    let model = model_of(source);
    let function = model.function("DIA_A_Hallo_Info").expect("function should exist");
    assert_eq!(function.actions.len(), 4);
    assert_eq!(function.actions[0].type_name(), "DialogLine");
    assert_eq!(
        function.actions[1],
        Action::raw("//AI_Output (self, other, \"DIA_A_Hallo_01_01\"); //commented out line")
    );
    assert_eq!(function.actions[2], Action::raw("B_GivePlayerXP (XP_Ambient)"));
    assert_eq!(function.actions[3], Action::raw("/* reward */"));
    assert!(function.actions[3].is_comment());

    let dialog = model.dialog("DIA_A_Hallo").expect("dialog should exist");
    assert_eq!(dialog.actions, function.actions);
}

#[test]
fn condition_comments_survive_in_both_modes() {
    let source = "instance DIA_C (C_INFO) { condition = DIA_C_Cond; };\n\
                  instance DIA_D (C_INFO) { condition = DIA_D_Cond; };\n\
                  func int DIA_C_Cond()\n\
                  {\n\
                  \t// chapter two only\n\
                  \tif (Kapitel == 2) { return TRUE; };\n\
                  };\n\
                  func int DIA_D_Cond()\n\
                  {\n\
                  \tif (A) { return TRUE; };\n\
                  \t// fallback\n\
                  \tif (B) { return TRUE; } else { return FALSE; };\n\
                  };\n";
    let model = model_of(source);

    let structured = model.function("DIA_C_Cond").expect("function should exist");
    assert!(!structured.raw);
    assert_eq!(structured.conditions.len(), 1);
    assert_eq!(structured.actions, vec![Action::raw("// chapter two only")]);

    let raw = model.function("DIA_D_Cond").expect("function should exist");
    assert!(raw.raw);
    assert_eq!(raw.actions.len(), 3);
    assert_eq!(raw.actions[0], Action::raw("if (A) { return TRUE; };"));
    assert_eq!(raw.actions[1], Action::raw("// fallback"));
    assert!(raw.actions[2]
        .raw_text()
        .map(|text| text.starts_with("if (B)"))
        .unwrap_or(false));
}

#[test]
fn globals_are_partitioned_by_parent_type() {
    let source = "const int KAPITEL_MAX = 6;\n\
                  var int Kapitel;\n\
                  instance PAL_200_Hagen (Npc_Default) { name = \"Lord Hagen\"; };\n\
                  instance ItMi_Gold (C_Item) { name = NAME_Gold; };\n\
                  instance Mds_Walk (C_MDS) { };\n";
    let model = model_of(source);
    assert_eq!(
        model.constants.get("KAPITEL_MAX").map(|c| c.value.clone()),
        Some(PrimitiveValue::Number(6.0))
    );
    assert!(model.variables.contains_key("Kapitel"));
    let hagen = model.npcs.get("PAL_200_Hagen").expect("npc should exist");
    assert_eq!(hagen.display_name.as_deref(), Some("Lord Hagen"));
    let gold = model.items.get("ItMi_Gold").expect("item should exist");
    assert_eq!(gold.display_name, None);
    assert!(model.animations.contains_key("Mds_Walk"));
    assert_eq!(model.instances.len(), 3);
    let kinds: Vec<DeclarationKind> = model.declaration_order.iter().map(|entry| entry.kind).collect();
    assert_eq!(
        kinds,
        vec![
            DeclarationKind::Constant,
            DeclarationKind::Variable,
            DeclarationKind::Instance,
            DeclarationKind::Instance,
            DeclarationKind::Instance,
        ]
    );
}

#[test]
fn leading_comments_attach_to_the_next_declaration() {
    let source = "// header\n/* block */\nfunc void A() { };\nvar int X;\n// tail\n";
    let model = model_of(source);
    let function = model.function("A").expect("function should exist");
    assert_eq!(function.leading_comments, vec!["// header", "/* block */"]);
    assert!(model.variables["X"].leading_comments.is_empty());
    assert_eq!(model.trailing_comments, vec!["// tail"]);
}

#[test]
fn syntax_errors_short_circuit_analysis() {
    let model = parse_semantic_model("instance DIA_E (C_INFO) { npc = ; };");
    assert!(model.has_errors);
    assert!(!model.errors.is_empty());
    assert!(model.dialogs.is_empty());
    assert!(model.declaration_order.is_empty());
}

#[test]
fn linking_before_declarations_is_rejected() {
    let tree = dd_parser::parse("func void A() { };");
    let mut model = SemanticModel::new();
    let mut context = BuildContext::new();
    let error = link_and_analyze(&tree, &mut model, &mut context)
        .expect_err("linking without declarations should fail");
    assert_eq!(error.code, "SEMANTIC_PASS_ORDER");
}

#[test]
fn function_style_is_captured() {
    let model = model_of("FUNC INT DIA_C (VAR C_NPC slf)\n{\n};\n");
    let function = model.function("DIA_C").expect("function should exist");
    assert_eq!(function.style.keyword.as_deref(), Some("FUNC"));
    assert!(function.style.space_before_paren);
    assert!(!function.style.has_body_content);
    assert_eq!(function.parameters, "VAR C_NPC slf");
    assert_eq!(function.return_type, "INT");
}

#[test]
fn property_spacing_is_captured_per_key() {
    let model = model_of("instance DIA_P (C_INFO)\n{\n\tnpc\t\t\t= NPC_A;\n\tnr=2;\n};\n");
    let dialog = model.dialog("DIA_P").expect("dialog should exist");
    let npc = &dialog.formatting.spacing["npc"];
    assert_eq!(npc.before_equals, "\t\t\t");
    assert_eq!(npc.after_equals, " ");
    let nr = &dialog.formatting.spacing["nr"];
    assert_eq!(nr.before_equals, "");
    assert_eq!(nr.after_equals, "");
}
