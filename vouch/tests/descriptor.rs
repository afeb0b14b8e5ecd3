//! Metadata emitted by `#[derive(Validate)]` and the bean registry.

use std::marker::PhantomData;

use vouch::constraints::{Constraint, Pattern};
use vouch::types::{ConstraintDescriptor, ExecutableDescriptor, ExecutableKind, ParameterDescriptor, ValidationScope};
use vouch::{BeanMetadata, ConstraintKind, Validate, find_bean, is_bean_registered, registered_beans};

#[derive(Debug, Validate)]
pub struct Article {
    #[validate(not_blank(message = "title required"), size(max = 120))]
    pub title: String,
    #[validate(pattern(regexp = "[a-z0-9-]+"))]
    pub slug: String,
    #[validate(each(not_blank))]
    pub tags: Vec<String>,
    #[validate(nested)]
    pub author: Option<Author>,
    pub body: String,
}

#[derive(Debug, Validate)]
pub struct Author {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Validate)]
pub struct Page<T> {
    #[validate(min = 1)]
    pub number: u32,
    pub marker: PhantomData<T>,
}

#[test]
fn descriptor_lists_every_field_in_order() {
    let descriptor = Article::bean_descriptor();
    assert_eq!(descriptor.name, "Article");
    let names: Vec<&str> = descriptor.properties.iter().map(|property| property.name.as_str()).collect();
    assert_eq!(names, ["title", "slug", "tags", "author", "body"]);

    let constrained: Vec<&str> = descriptor
        .constrained_properties()
        .map(|property| property.name.as_str())
        .collect();
    assert_eq!(constrained, ["title", "slug", "tags", "author"]);
}

#[test]
fn constraint_descriptors_carry_attributes_and_scope() {
    let descriptor = Article::bean_descriptor();

    let title = descriptor.property("title").expect("title");
    let kinds: Vec<ConstraintKind> = title.constraints.iter().map(|constraint| constraint.kind()).collect();
    assert_eq!(kinds, [ConstraintKind::NotBlank, ConstraintKind::Size]);
    assert_eq!(title.constraints[0].message_template, "title required");
    assert_eq!(title.constraints[1].message_template, "{vouch.constraints.Size.message}");
    assert_eq!(
        title.constraints[1].constraint,
        Constraint::Size {
            min: 0,
            max: 120
        }
    );

    let slug = descriptor.property("slug").expect("slug");
    assert_eq!(slug.constraints[0].constraint, Constraint::Pattern(Pattern::new("[a-z0-9-]+", false)));

    let tags = descriptor.property("tags").expect("tags");
    assert_eq!(tags.constraints[0].scope, ValidationScope::EachElement);
    assert_eq!(tags.element_constraints().count(), 1);
    assert_eq!(tags.field_constraints().count(), 0);

    let author = descriptor.property("author").expect("author");
    assert!(author.cascaded);
    assert!(author.constraints.is_empty());
}

#[test]
fn derived_beans_are_registered() {
    assert!(is_bean_registered::<Article>());
    assert!(is_bean_registered::<Author>());

    let registration = find_bean("Author").expect("Author registered");
    assert_eq!(registration.descriptor().name, "Author");
    assert!(registration.descriptor().property("email").is_some());

    assert!(registered_beans().any(|bean| bean.type_name == "Article"));
}

#[test]
fn generic_beans_validate_but_are_not_registered() -> anyhow::Result<()> {
    assert!(!is_bean_registered::<Page<String>>());
    assert!(find_bean("Page").is_none());

    let page = Page::<String> {
        number: 0,
        marker: PhantomData,
    };
    let violations = vouch::Validator::default().validate(&page)?;
    assert_eq!(violations.len(), 1);
    assert_eq!(Page::<u8>::bean_descriptor().name, "Page");
    Ok(())
}

#[test]
fn constructor_descriptors_root_parameter_paths() -> anyhow::Result<()> {
    let executable = ExecutableDescriptor::constructor(
        "new",
        vec![ParameterDescriptor::new(0, "title").with_constraint(ConstraintDescriptor::new(Constraint::NotBlank))],
    );
    assert_eq!(executable.kind, ExecutableKind::Constructor);
    assert_eq!(executable.parameter("title").map(|parameter| parameter.index), Some(0));

    let validator = vouch::Validator::default();
    let violations = validator
        .for_executables()
        .validate_parameters("Article", &executable, |ctx| {
            ctx.validate_parameter(&executable.parameters[0], "")
        })?;
    let paths: Vec<String> = violations.iter().map(|violation| violation.property_path.to_string()).collect();
    assert_eq!(paths, ["new.title"]);
    Ok(())
}
