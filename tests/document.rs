use formlens::model::FragmentBody;
use formlens::{FormError, parse_document};

const FORM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!--
  Form...........: AUTG0006
  Autore.........: ufficio IT
  Descrizione....:   Gestione autorizzazioni utente
-->
<form name="AUTG0006">
  <events>
    <whenNewFormInstance actionRef="loadDefaults, notDefined , audit"/>
  </events>
  <popups>
    <popup name="popUsers" title="Users" width="800" height="600">
      <callFormPopup>
        <callFormName> USRG0001 </callFormName>
        <paramsList>
          <param name="USER_ID" alias="P_USER"/>
        </paramsList>
      </callFormPopup>
      <grids>
        <grid name="gridUsers"/>
        <grid name="gridMissing"/>
      </grids>
    </popup>
    <popup name="popInfo" title="Info"/>
  </popups>
  <actions>
    <action name="loadDefaults">
      <classes>
        <class name="defaults" class="GroovyExecutor">
          <param name="groovy"><![CDATA[ form.mode = "EDIT" ]]></param>
        </class>
      </classes>
    </action>
    <action name="audit">
      <classes>
        <class name="auditSql" class="SqlExecutor">
          <param name="sql">INSERT INTO AUDIT VALUES (SYSDATE)</param>
        </class>
      </classes>
    </action>
  </actions>
  <grid name="gridUsers" label="Users"/>
  <grid name="gridUsers" label="Users again"/>
</form>
"#;

#[test]
fn description_is_read_from_comment() {
    let doc = parse_document(FORM).expect("parse");
    assert_eq!(
        doc.description.as_deref(),
        Some("Gestione autorizzazioni utente")
    );
}

#[test]
fn form_init_event_resolves_known_actions_in_order() {
    let doc = parse_document(FORM).expect("parse");
    let init = &doc.form_init_event;
    assert_eq!(init.action_refs, vec!["loadDefaults", "notDefined", "audit"]);
    assert_eq!(init.resolved_actions.len(), 2);
    assert_eq!(init.resolved_actions[0].action_name, "loadDefaults");
    assert_eq!(
        init.resolved_actions[0].fragments[0].body,
        FragmentBody::Groovy {
            script: r#"form.mode = "EDIT""#.to_string()
        }
    );
    assert_eq!(init.resolved_actions[1].action_name, "audit");
    match &init.resolved_actions[1].fragments[0].body {
        FragmentBody::Sql { sql, function } => {
            assert_eq!(sql, "INSERT INTO AUDIT VALUES (SYSDATE)");
            assert_eq!(function, &None);
        }
        other => panic!("expected SQL fragment, got {:?}", other),
    }
    assert_eq!(init.unresolved().collect::<Vec<_>>(), vec!["notDefined"]);
}

#[test]
fn popups_with_and_without_call_form() {
    let doc = parse_document(FORM).expect("parse");
    assert_eq!(doc.popups.len(), 2);

    let users = &doc.popups[0];
    assert_eq!(users.name.as_deref(), Some("popUsers"));
    assert_eq!(users.title.as_deref(), Some("Users"));
    assert_eq!(users.width.as_deref(), Some("800"));
    assert_eq!(users.height.as_deref(), Some("600"));
    assert_eq!(users.target_form_name.as_deref(), Some("USRG0001"));
    assert_eq!(users.params.len(), 1);
    assert_eq!(users.params[0].name.as_deref(), Some("USER_ID"));
    assert_eq!(users.params[0].alias.as_deref(), Some("P_USER"));
    assert_eq!(users.associated_grid_names, vec!["gridUsers", "gridMissing"]);

    let resolved: Vec<_> = users.grids(&doc).map(|g| g.name.as_deref()).collect();
    assert_eq!(resolved, vec![Some("gridUsers"), Some("gridMissing")]);

    let info = &doc.popups[1];
    assert_eq!(info.target_form_name, None);
    assert!(info.params.is_empty());
    assert!(info.associated_grid_names.is_empty());
}

#[test]
fn grids_keep_document_order_and_duplicates() {
    let doc = parse_document(FORM).expect("parse");
    // Two name-only references inside the popup, then the two form grids.
    let labels: Vec<_> = doc.grids.iter().map(|g| g.label.as_deref()).collect();
    assert_eq!(labels, vec![None, None, Some("Users"), Some("Users again")]);
    assert_eq!(doc.grids_named("gridUsers").count(), 3);
    assert_eq!(doc.grid("gridMissing").map(|g| g.label.clone()), Some(None));
}

#[test]
fn description_line_must_close_the_comment() {
    let xml = "<!--\n Descrizione..: first\n Autore..: x\n-->\n<form/>";
    assert_eq!(parse_document(xml).expect("parse").description, None);
}

#[test]
fn popup_grid_lookup_skips_unknown_names() {
    let doc = formlens::model::Document {
        popups: vec![formlens::model::Popup {
            associated_grid_names: vec!["nowhere".into()],
            ..Default::default()
        }],
        ..Default::default()
    };
    assert_eq!(doc.popups[0].grids(&doc).count(), 0);
}

#[test]
fn minimal_form_yields_empty_model() {
    let doc = parse_document("<form/>").expect("parse");
    assert_eq!(doc.description, None);
    assert!(doc.grids.is_empty());
    assert!(doc.popups.is_empty());
    assert!(doc.form_init_event.is_empty());
    assert!(doc.form_init_event.resolved_actions.is_empty());
}

#[test]
fn new_instance_event_outside_form_events_is_ignored() {
    let xml = r#"<form>
      <action name="a"><classes><class><param name="groovy">A</param></class></classes></action>
      <grid name="g"><events><whenNewFormInstance actionRef="a"/></events></grid>
    </form>"#;
    let doc = parse_document(xml).expect("parse");
    assert!(doc.form_init_event.is_empty());
    assert_eq!(doc.grids[0].events[0].name, "whenNewFormInstance");
}

#[test]
fn doctype_is_accepted() {
    let xml = r#"<?xml version="1.0"?>
<!DOCTYPE form SYSTEM "form.dtd">
<form><grid name="g"/></form>"#;
    let doc = parse_document(xml).expect("parse with doctype");
    assert_eq!(doc.grids.len(), 1);
}

#[test]
fn malformed_input_is_rejected() {
    let err = parse_document("<form><grid></form>").expect_err("unbalanced tags");
    assert!(matches!(err, FormError::MalformedInput(_)));
    assert!(err.to_string().starts_with("malformed form XML"));

    assert!(matches!(
        parse_document(""),
        Err(FormError::MalformedInput(_))
    ));
}

#[test]
fn model_serializes_to_plain_json() {
    let doc = parse_document(FORM).expect("parse");
    let v = serde_json::to_value(&doc).expect("serialize");
    assert_eq!(v["description"], "Gestione autorizzazioni utente");
    assert_eq!(v["form_init_event"]["action_refs"][0], "loadDefaults");
    let frag = &v["form_init_event"]["resolved_actions"][1]["fragments"][0];
    assert_eq!(frag["kind"], "sql");
    assert_eq!(frag["class_name"], "auditSql");
    assert_eq!(v["grids"][2]["insert_allowed"]["source"], "default");
    assert_eq!(v["popups"][0]["associated_grid_names"][1], "gridMissing");

    let back: formlens::model::Document = serde_json::from_value(v).expect("deserialize");
    assert_eq!(back, doc);
}
