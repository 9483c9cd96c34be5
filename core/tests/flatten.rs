use oasflat_core::{
    extract, parse_document, resolve, CompositionKind, PropertyType, ResolutionErrorKind,
    SchemaKind, SchemaMap,
};
use pretty_assertions::assert_eq;
use serde_json::Value;

const PETSTORE: &str = r#"
openapi: 3.0.3
info:
  title: Petstore
  version: 1.0.0
paths:
  /users/{id}:
    get:
      operationId: getUser
      parameters:
        - $ref: '#/components/parameters/UserId'
      responses:
        '200':
          description: OK
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/User'
        '404':
          $ref: '#/components/responses/NotFound'
  /pets:
    post:
      requestBody:
        content:
          application/json:
            schema:
              type: object
              required: [pet]
              properties:
                pet:
                  $ref: '#/components/schemas/Pet'
                tags:
                  type: array
                  items: {type: string}
      responses:
        '201':
          description: Created
          content:
            application/json:
              schema:
                type: object
                properties:
                  id: {type: string, format: uuid}
components:
  parameters:
    UserId:
      name: id
      in: path
      required: true
      schema: {type: string}
  responses:
    NotFound:
      description: Not found
      content:
        application/json:
          schema:
            $ref: '#/components/schemas/Error'
  schemas:
    Error:
      type: object
      properties:
        code: {type: integer, minimum: 100, maximum: 599}
        message: {type: string}
    Address:
      type: object
      properties:
        street: {type: string, maxLength: 128}
        geo:
          type: object
          properties:
            lat: {type: number}
            lng: {type: number}
    User:
      type: object
      required: [id]
      properties:
        id: {type: integer, format: int64}
        address:
          $ref: '#/components/schemas/Address'
    Cat:
      type: object
      properties:
        meows: {type: boolean}
    Dog:
      type: object
      properties:
        barks: {type: boolean}
    Pet:
      oneOf:
        - $ref: '#/components/schemas/Cat'
        - $ref: '#/components/schemas/Dog'
"#;

fn contains_ref(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.contains_key("$ref") || map.values().any(contains_ref),
        Value::Array(items) => items.iter().any(contains_ref),
        _ => false,
    }
}

fn flatten(yaml: &str) -> SchemaMap {
    let resolution = resolve(parse_document(yaml).unwrap(), "openapi.yaml");
    assert!(resolution.is_clean(), "{:?}", resolution.errors);
    extract(&resolution.document).unwrap()
}

#[test]
fn test_user_address_end_to_end() {
    let yaml = r#"
openapi: 3.0.3
paths: {}
components:
  schemas:
    User:
      type: object
      properties:
        address:
          $ref: '#/components/schemas/Address'
    Address:
      type: object
      properties:
        city: {type: string}
        geo:
          type: object
          properties:
            lat: {type: number}
"#;
    let resolution = resolve(parse_document(yaml).unwrap(), "openapi.yaml");
    assert_eq!(resolution.resolved, 1);
    assert!(resolution.errors.is_empty());

    let map = extract(&resolution.document).unwrap();
    let names: Vec<&str> = map.names().collect();
    assert_eq!(
        names,
        vec!["User", "UserAddress", "UserAddressGeo", "Address", "AddressGeo"]
    );

    let user = map.get("User").unwrap();
    assert_eq!(
        user.properties["address"].ty,
        PropertyType::Schema {
            name: "UserAddress".into()
        }
    );
    let address = map.get("UserAddress").unwrap();
    assert_eq!(address.properties["city"].ty, PropertyType::String);
    assert_eq!(
        address.properties["geo"].ty,
        PropertyType::Schema {
            name: "UserAddressGeo".into()
        }
    );
}

#[test]
fn test_petstore_resolves_every_reference() {
    let resolution = resolve(parse_document(PETSTORE).unwrap(), "openapi.yaml");
    assert!(resolution.is_clean());
    assert!(!contains_ref(&resolution.document));
    // Paths: UserId, User, NotFound, Pet = 4.
    // Components: NotFound's Error, User's Address, Pet's Cat and Dog = 4.
    assert_eq!(resolution.resolved, 8);
    assert_eq!(
        resolution.document["paths"]["/users/{id}"]["get"]["parameters"][0]["name"],
        Value::String("id".into())
    );
}

#[test]
fn test_petstore_schema_map() {
    let map = flatten(PETSTORE);
    let names: Vec<&str> = map.names().collect();
    assert_eq!(
        names,
        vec![
            "Error",
            "Address",
            "AddressGeo",
            "User",
            "UserAddress",
            "UserAddressGeo",
            "Cat",
            "Dog",
            "Pet",
            "PetOption1",
            "PetOption2",
            "PostPetsRequestSchema",
            "PostPetsRequestSchemaPet",
            "PostPetsRequestSchemaPetOption1",
            "PostPetsRequestSchemaPetOption2",
            "PostPets201Schema",
        ]
    );

    let pet = map.get("Pet").unwrap();
    assert_eq!(pet.kind, SchemaKind::Union);
    let composition = pet.composition.as_ref().unwrap();
    assert_eq!(composition.kind, CompositionKind::OneOf);
    assert_eq!(
        composition.member_names,
        vec!["PetOption1".to_string(), "PetOption2".to_string()]
    );
    assert!(map.get("PetOption2").unwrap().properties.contains_key("barks"));

    let error = map.get("Error").unwrap();
    let code = error.properties["code"].constraints.as_ref().unwrap();
    assert_eq!(code.minimum.as_ref().and_then(|n| n.as_i64()), Some(100));
    assert_eq!(code.maximum.as_ref().and_then(|n| n.as_i64()), Some(599));

    let request = map.get("PostPetsRequestSchema").unwrap();
    assert!(request.properties["pet"].required);
    assert_eq!(
        request.properties["tags"].ty,
        PropertyType::Array {
            items: Box::new(PropertyType::String)
        }
    );

    let serialized = serde_json::to_value(&map).unwrap();
    assert!(!contains_ref(&serialized));
}

#[test]
fn test_duplicate_synthesized_names_are_suffixed() {
    let yaml = r#"
openapi: 3.0.3
paths: {}
components:
  schemas:
    Order:
      type: object
      properties:
        line_item:
          type: object
          properties:
            sku: {type: string}
        lineItem:
          type: object
          properties:
            qty: {type: integer}
        LineItem:
          type: object
          properties:
            price: {type: number}
"#;
    let map = flatten(yaml);
    let names: Vec<&str> = map.names().collect();
    assert_eq!(
        names,
        vec!["Order", "OrderLineItem", "OrderLineItem2", "OrderLineItem3"]
    );
    let order = map.get("Order").unwrap();
    assert_eq!(
        order.properties["LineItem"].ty,
        PropertyType::Schema {
            name: "OrderLineItem3".into()
        }
    );

    // identical input, identical names
    let again = flatten(yaml);
    let again: Vec<&str> = again.names().collect();
    assert_eq!(again, names);
}

#[test]
fn test_all_of_union_of_disjoint_members() {
    let yaml = r#"
openapi: 3.0.3
paths: {}
components:
  schemas:
    Base:
      type: object
      required: [id]
      properties:
        id: {type: string}
    Extended:
      allOf:
        - $ref: '#/components/schemas/Base'
        - type: object
          required: [label]
          description: Extended thing
          properties:
            label: {type: string}
            size: {type: integer}
"#;
    let map = flatten(yaml);
    let extended = map.get("Extended").unwrap();
    assert_eq!(extended.kind, SchemaKind::Object);
    let props: Vec<&str> = extended.properties.keys().map(String::as_str).collect();
    assert_eq!(props, vec!["id", "label", "size"]);
    let required: Vec<&str> = extended.required.iter().map(String::as_str).collect();
    assert_eq!(required, vec!["id", "label"]);
    assert_eq!(extended.description.as_deref(), Some("Extended thing"));
}

#[test]
fn test_recursive_schema_terminates() {
    let yaml = r#"
openapi: 3.0.3
paths: {}
components:
  schemas:
    Node:
      type: object
      properties:
        value: {type: string}
        children:
          type: array
          items:
            $ref: '#/components/schemas/Node'
"#;
    let resolution = resolve(parse_document(yaml).unwrap(), "openapi.yaml");
    assert_eq!(resolution.errors.len(), 1);
    assert_eq!(resolution.errors[0].kind, ResolutionErrorKind::Circular);

    let map = extract(&resolution.document).unwrap();
    let names: Vec<&str> = map.names().collect();
    assert_eq!(names, vec!["Node", "NodeChildrenItem"]);
    assert_eq!(
        map.get("NodeChildrenItem").unwrap().properties["children"].ty,
        PropertyType::Array {
            items: Box::new(PropertyType::Schema {
                name: "Node".into()
            })
        }
    );
    assert!(!contains_ref(&serde_json::to_value(&map).unwrap()));
}

#[test]
fn test_schema_map_json_round_trip() {
    let map = flatten(PETSTORE);
    let json = map.to_json().unwrap();
    let back = SchemaMap::from_json(json).unwrap();
    assert_eq!(back, map);
}

#[test]
fn test_schema_map_from_json_rejects_reference_markers() {
    let json = serde_json::json!({
        "A": {"name": "A", "kind": "object", "example": {"$ref": "#/components/schemas/B"}}
    });
    assert!(SchemaMap::from_json(json).is_err());
}

#[test]
fn test_mutually_recursive_all_of_keeps_inherited_properties() {
    let yaml = r#"
openapi: 3.0.3
paths: {}
components:
  schemas:
    A:
      type: object
      properties:
        b:
          $ref: '#/components/schemas/B'
    B:
      allOf:
        - $ref: '#/components/schemas/A'
        - type: object
          properties:
            x: {type: string}
"#;
    let resolution = resolve(parse_document(yaml).unwrap(), "openapi.yaml");
    assert_eq!(resolution.errors.len(), 1);
    assert_eq!(resolution.errors[0].kind, ResolutionErrorKind::Circular);

    let map = extract(&resolution.document).unwrap();
    let names: Vec<&str> = map.names().collect();
    assert_eq!(names, vec!["A", "AB", "B", "BB"]);

    for name in ["AB", "B", "BB"] {
        let props: Vec<&str> = map
            .get(name)
            .unwrap()
            .properties
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(props, vec!["b", "x"], "properties of {}", name);
    }
    assert_eq!(
        map.get("AB").unwrap().properties["b"].ty,
        PropertyType::Schema { name: "B".into() }
    );
    assert_eq!(
        map.get("BB").unwrap().properties["b"].ty,
        PropertyType::Schema { name: "AB".into() }
    );
    assert!(!contains_ref(&serde_json::to_value(&map).unwrap()));
}
