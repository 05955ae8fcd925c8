//! The same model declared as Rust source and as `Reflect` impls must
//! produce the same repository facts.

use chrono::{DateTime, Utc};

use gantry_adapters::{
    Reflect, ReflectType, ReflectionTypeSource, SymbolTypeSource, reflect_types,
    source::reflection::field,
};
use gantry_core::domain::{
    Annotation, MethodDescriptor, ParameterDescriptor, Primitive, ReflectionRepository,
    TypeDescriptor, TypeIdentity, TypeSource, TypeViewModel,
};

const SHOP: &str = r#"
    #[db_context]
    pub struct ShopDb {
        pub products: DbSet<Product>,
        pub orders: DbSet<Order>,
    }

    #[read(allow_anonymous)]
    #[delete(deny_all)]
    pub struct Product {
        pub product_id: i32,
        pub name: String,
        pub description: Option<String>,
        pub status: Status,
        pub tags: Vec<String>,
        pub orders: Vec<Order>,
    }

    impl Product {
        #[method]
        pub fn rename(&mut self, name: String, user: CurrentUser) -> bool {
            true
        }

        #[method]
        #[execute("Admin")]
        pub fn count_live(status: Option<Status>) -> i64 {
            0
        }
    }

    pub struct Order {
        pub order_id: i64,
        pub product_id: i32,
        pub product: Option<Product>,
        #[read("Sales")]
        pub total: f64,
        pub placed_at: DateTime<Utc>,
    }

    pub enum Status {
        Draft,
        Live,
        Retired = 9,
    }
"#;

fn id(name: &str) -> TypeIdentity {
    TypeIdentity::new("shop", name)
}

struct ShopDb;
struct Product;
struct Order;
struct Status;

struct DbSet<T>(std::marker::PhantomData<T>);

impl<T: ReflectType> ReflectType for DbSet<T> {
    fn type_view() -> TypeViewModel {
        TypeViewModel::collection(T::type_view())
    }
}

reflect_types!(class ShopDb, Product, Order; enum Status);

impl Reflect for ShopDb {
    fn identity() -> TypeIdentity {
        id("ShopDb")
    }

    fn describe() -> TypeDescriptor {
        TypeDescriptor::class(Self::identity())
            .annotate(Annotation::new("db_context"))
            .field(field::<DbSet<Product>>("Products").source_name("products"))
            .field(field::<DbSet<Order>>("Orders").source_name("orders"))
    }
}

impl Reflect for Product {
    fn identity() -> TypeIdentity {
        id("Product")
    }

    fn describe() -> TypeDescriptor {
        let current_user = TypeViewModel::class(id("CurrentUser"));
        TypeDescriptor::class(Self::identity())
            .annotate(Annotation::new("read").flag("allow_anonymous"))
            .annotate(Annotation::new("delete").flag("deny_all"))
            .field(field::<i32>("ProductId").source_name("product_id"))
            .field(field::<String>("Name").source_name("name"))
            .field(field::<Option<String>>("Description").source_name("description"))
            .field(field::<Status>("Status").source_name("status"))
            .field(field::<Vec<String>>("Tags").source_name("tags"))
            .field(field::<Vec<Order>>("Orders").source_name("orders"))
            .method(
                MethodDescriptor::new("Rename", bool::type_view())
                    .source_name("rename")
                    .annotate(Annotation::new("method"))
                    .parameter(ParameterDescriptor::new("name", String::type_view()))
                    .parameter(ParameterDescriptor::new("user", current_user)),
            )
            .method(
                MethodDescriptor::new("CountLive", i64::type_view())
                    .source_name("count_live")
                    .is_static(true)
                    .annotate(Annotation::new("method"))
                    .annotate(Annotation::new("execute").string("Admin"))
                    .parameter(
                        ParameterDescriptor::new("status", <Option<Status>>::type_view()).with_default(),
                    ),
            )
    }
}

impl Reflect for Order {
    fn identity() -> TypeIdentity {
        id("Order")
    }

    fn describe() -> TypeDescriptor {
        TypeDescriptor::class(Self::identity())
            .field(field::<i64>("OrderId").source_name("order_id"))
            .field(field::<i32>("ProductId").source_name("product_id"))
            .field(field::<Option<Product>>("Product").source_name("product"))
            .field(
                field::<f64>("Total")
                    .source_name("total")
                    .annotate(Annotation::new("read").string("Sales")),
            )
            .field(field::<DateTime<Utc>>("PlacedAt").source_name("placed_at"))
    }
}

impl Reflect for Status {
    fn identity() -> TypeIdentity {
        id("Status")
    }

    fn describe() -> TypeDescriptor {
        TypeDescriptor::enumeration(
            Self::identity(),
            vec![("Draft".into(), 0), ("Live".into(), 1), ("Retired".into(), 9)],
        )
    }
}

fn repository(source: &dyn TypeSource) -> ReflectionRepository {
    let mut repository = ReflectionRepository::new();
    repository.discover_all(source).unwrap();
    repository
}

fn backends() -> (ReflectionRepository, ReflectionRepository) {
    let symbol = SymbolTypeSource::from_source("shop", SHOP).unwrap();
    let reflection = ReflectionTypeSource::new()
        .register::<ShopDb>()
        .register::<Product>()
        .register::<Order>()
        .register::<Status>();
    (repository(&symbol), repository(&reflection))
}

#[test]
fn both_backends_declare_the_same_types() {
    let (symbol, reflection) = backends();
    let names = |repo: &ReflectionRepository| {
        let mut names: Vec<String> = repo.classes().map(|c| c.identity().to_string()).collect();
        names.sort();
        names
    };
    assert_eq!(names(&symbol), names(&reflection));
    assert_eq!(symbol.enums().count(), 1);
    assert_eq!(
        symbol.enums().next().map(|e| e.values.clone()),
        reflection.enums().next().map(|e| e.values.clone())
    );
}

#[test]
fn property_facts_match_property_by_property() {
    let (symbol, reflection) = backends();

    for class in symbol.classes() {
        let twin = reflection.class_by_identity(class.identity()).unwrap();
        assert_eq!(class.properties().len(), twin.properties().len(), "{}", class.name());

        for (left, right) in class.properties().iter().zip(twin.properties()) {
            let context = format!("{}.{}", class.name(), left.name());
            assert_eq!(left.name(), right.name(), "{context}");
            assert_eq!(left.source_name(), right.source_name(), "{context}");
            assert_eq!(left.role(), right.role(), "{context}");
            assert_eq!(left.ty(), right.ty(), "{context}");
            assert_eq!(left.ty().is_nullable(), right.ty().is_nullable(), "{context}");
            assert_eq!(left.security(), right.security(), "{context}");
        }
        assert_eq!(class.security(), twin.security(), "{}", class.name());
        assert_eq!(class.issues(), twin.issues(), "{}", class.name());
    }
}

#[test]
fn method_facts_match() {
    let (symbol, reflection) = backends();
    let product = symbol.find_class("Product").unwrap();
    let twin = reflection.find_class("Product").unwrap();

    assert_eq!(product.methods().len(), 2);
    for (left, right) in product.methods().iter().zip(twin.methods()) {
        assert_eq!(left.name(), right.name());
        assert_eq!(left.source_name(), right.source_name());
        assert_eq!(left.is_static(), right.is_static());
        assert_eq!(left.return_type(), right.return_type());
        assert_eq!(left.parameters(), right.parameters());
        assert_eq!(left.security(), right.security());
    }

    let rename = product.method_by_name("Rename").unwrap();
    assert_eq!(rename.client_parameters().count(), 1);
}

#[test]
fn inferred_roles_are_the_expected_ones() {
    let (symbol, _) = backends();
    let order = symbol.find_class("Order").unwrap();

    assert_eq!(order.primary_key().map(|p| p.name()), Some("OrderId"));
    let fk = order.property_by_name("ProductId").unwrap();
    assert_eq!(fk.navigation(), Some("Product"));
    assert_eq!(
        order.property_by_name("PlacedAt").unwrap().ty(),
        &TypeViewModel::primitive(Primitive::DateTime)
    );
}
