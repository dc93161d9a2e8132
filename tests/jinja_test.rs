use std::collections::HashMap;

use yamlhost::template::jinja::{
    has_jinja_blocks, preprocess_jinja, strip_jinja_blocks, validate_jinja,
};

fn context() -> HashMap<String, String> {
    let mut ctx = HashMap::new();
    ctx.insert("project_name".to_string(), "test-project".to_string());
    ctx.insert("stack_name".to_string(), "dev".to_string());
    ctx
}

#[test]
fn test_has_jinja_blocks_true() {
    let source = r#"resources:
{% for i in range(3) %}
  bucket{{ i }}:
    type: gcp:storage:Bucket
{% endfor %}
"#;
    assert!(has_jinja_blocks(source));
}

#[test]
fn test_has_jinja_blocks_false_expression_only() {
    let source = r#"resources:
  bucket:
    type: gcp:storage:Bucket
    properties:
      name: "{{ pulumi_project }}-bucket"
"#;
    assert!(!has_jinja_blocks(source));
}

#[test]
fn test_has_jinja_blocks_false_plain() {
    assert!(!has_jinja_blocks("name: test\nruntime: yaml\n"));
}

#[test]
fn test_strip_removes_block_lines() {
    let source = "name: test\n{% for i in range(2) %}\n  bucket{{ i }}:\n    type: gcp:storage:Bucket\n{% endfor %}\n";
    let stripped = strip_jinja_blocks(source);
    assert!(!stripped.contains("{% for"));
    assert!(!stripped.contains("{% endfor"));
    assert!(stripped.contains("name: test"));
    assert!(stripped.contains("bucket{{ i }}"));
}

#[test]
fn test_strip_preserves_expression_lines() {
    let source = "name: \"{{ pulumi_project }}\"\nruntime: yaml\n";
    let stripped = strip_jinja_blocks(source);
    assert!(stripped.contains("{{ pulumi_project }}"));
}

#[test]
fn test_strip_plain_yaml_unchanged() {
    let source = "name: test\nruntime: yaml\n";
    assert_eq!(strip_jinja_blocks(source), source);
}

#[test]
fn test_strip_is_idempotent() {
    let source = "name: test\n{% if flag %}\nextra: true\n{% endif %}\n";
    let once = strip_jinja_blocks(source);
    assert_eq!(strip_jinja_blocks(&once), once);
}

#[test]
fn test_validate_valid_syntax() {
    let source = r#"name: jinja-block-test
runtime: yaml
resources:
{% for i in range(2) %}
  bucket{{ i }}:
    type: gcp:storage:Bucket
    properties:
      name: "bucket-{{ i }}"
{% endfor %}
"#;
    validate_jinja(source, "test.yaml").expect("balanced blocks should validate");
}

#[test]
fn test_validate_unclosed_block_error() {
    let source = "{% for x in items %}\nhello\n";
    let err = validate_jinja(source, "test.yaml").unwrap_err();
    assert_eq!(err.code(), "UnbalancedBlocks");
}

#[test]
fn test_validate_plain_yaml_passes() {
    validate_jinja("name: test\nruntime: yaml\n", "test.yaml").expect("plain yaml should pass");
}

#[test]
fn test_preprocess_substitutes_variables() {
    let source = "name: \"{{ pulumi_project }}\"\nruntime: yaml\n";
    let result = preprocess_jinja(source, "test.yaml", &context()).unwrap();
    assert!(result.contains("test-project"));
}

#[test]
fn test_preprocess_dotted_context_keys() {
    let source = "env: \"{{ config.env }}\"\n";
    let mut ctx = context();
    ctx.insert("config.env".to_string(), "prod".to_string());
    let result = preprocess_jinja(source, "test.yaml", &ctx).unwrap();
    assert!(result.contains("prod"));
}

#[test]
fn test_preprocess_loop_expansion() {
    let source = r#"resources:
{% for i in range(2) %}
  bucket{{ i }}:
    type: gcp:storage:Bucket
{% endfor %}
"#;
    let result = preprocess_jinja(source, "test.yaml", &context()).unwrap();
    assert!(result.contains("bucket0"));
    assert!(result.contains("bucket1"));
    assert!(!result.contains("{% for"));
}

#[test]
fn test_preprocess_missing_context_key() {
    let source = "name: \"{{ unknown_var }}\"\n";
    let err = preprocess_jinja(source, "test.yaml", &context()).unwrap_err();
    assert_eq!(err.code(), "UnknownTemplateKey");
}

#[test]
fn test_preprocess_render_free_text_unchanged() {
    let source = "name: test\nruntime: yaml\ndescription: plain text\n";
    let result = preprocess_jinja(source, "test.yaml", &context()).unwrap();
    assert_eq!(result, source);
}
