//! Shared fixture: an in-memory snapshot of a small shop database covering
//! every assembly phase: enum/domain/composite types, tables with foreign
//! keys, a join table, a self-referencing join table, a view, a materialized
//! view, a sequence, functions and a trigger.
#![allow(dead_code)]

use pgmap::catalog::column::ColumnRow;
use pgmap::catalog::constraint::ConstraintRow;
use pgmap::catalog::entity::EntityRow;
use pgmap::catalog::function::FunctionRow;
use pgmap::catalog::index::IndexRow;
use pgmap::catalog::pg_type::TypeRow;
use pgmap::catalog::schema::SchemaRow;
use pgmap::catalog::trigger::TriggerRow;
use pgmap::{Db, Oid, Options, QueryResults, Snapshot};

pub const PG_CATALOG: Oid = Oid(11);
pub const PUBLIC: Oid = Oid(2200);

// pg_catalog types
pub const T_BOOL: Oid = Oid(16);
pub const T_INT4: Oid = Oid(23);
pub const T_TEXT: Oid = Oid(25);
pub const T_VARCHAR: Oid = Oid(1043);
pub const T_NUMERIC: Oid = Oid(1700);

// public types
pub const T_ORDER_STATUS: Oid = Oid(9001);
pub const T_PRICE: Oid = Oid(9002);
pub const T_ADDRESS: Oid = Oid(9003);
pub const C_ADDRESS: Oid = Oid(9103);
pub const T_ACCOUNT_ROW: Oid = Oid(9101);

// entities
pub const ACCOUNT: Oid = Oid(16001);
pub const CONTACT: Oid = Oid(16002);
pub const ORDER: Oid = Oid(16003);
pub const CART: Oid = Oid(16004);
pub const PRODUCT: Oid = Oid(16005);
pub const CART_PRODUCT: Oid = Oid(16006);
pub const PERSON: Oid = Oid(16007);
pub const FRIENDSHIP: Oid = Oid(16008);
pub const ACCOUNT_EMAILS: Oid = Oid(16010);
pub const ORDER_TOTALS: Oid = Oid(16011);
pub const ACCOUNT_ID_SEQ: Oid = Oid(16012);

// indexes
pub const IX_ACCOUNT_PKEY: Oid = Oid(17001);
pub const IX_ACCOUNT_EMAIL_KEY: Oid = Oid(17002);
pub const IX_ACCOUNT_EMAIL_LOWER: Oid = Oid(17003);
pub const IX_CONTACT_PKEY: Oid = Oid(17004);
pub const IX_ORDER_PKEY: Oid = Oid(17005);
pub const IX_CART_PKEY: Oid = Oid(17006);
pub const IX_PRODUCT_PKEY: Oid = Oid(17007);
pub const IX_CART_PRODUCT_PKEY: Oid = Oid(17008);
pub const IX_PERSON_PKEY: Oid = Oid(17009);
pub const IX_FRIENDSHIP_PKEY: Oid = Oid(17010);
pub const IX_ORDER_TOTALS_ACCOUNT: Oid = Oid(17011);

pub fn schema_row(oid: Oid, name: &str) -> SchemaRow {
    SchemaRow { oid, name: name.to_string(), comment: None }
}

pub fn base_type_row(oid: Oid, name: &str) -> TypeRow {
    TypeRow {
        oid,
        class_oid: None,
        schema_oid: PG_CATALOG,
        name: name.to_string(),
        kind: "b".to_string(),
        sql_type: None,
        values: None,
        relation_kind: None,
        comment: None,
    }
}

pub fn entity_row(oid: Oid, kind: &str, name: &str) -> EntityRow {
    EntityRow {
        oid,
        schema_oid: PUBLIC,
        kind: kind.to_string(),
        name: name.to_string(),
        definition: None,
        comment: None,
    }
}

pub fn column_row(parent_oid: Oid, parent_kind: &str, name: &str, attnum: i16, type_oid: Oid) -> ColumnRow {
    ColumnRow {
        parent_oid,
        parent_kind: parent_kind.to_string(),
        name: name.to_string(),
        attribute_number: attnum,
        type_oid,
        type_modifier: -1,
        not_null: false,
        default_value: None,
        array_dimension: 0,
        identity: None,
        generated_expression: None,
        comment: None,
    }
}

pub fn index_row(oid: Oid, table_oid: Oid, name: &str, positions: Vec<i16>) -> IndexRow {
    IndexRow {
        oid,
        table_oid,
        name: name.to_string(),
        method: "btree".to_string(),
        is_unique: false,
        is_primary: false,
        partial_expression: None,
        column_positions: positions,
        expressions: Vec::new(),
        comment: None,
    }
}

pub fn pk_row(oid: Oid, table_oid: Oid, name: &str, index_oid: Oid, conkey: Vec<i16>) -> ConstraintRow {
    ConstraintRow {
        oid,
        kind: "p".to_string(),
        name: name.to_string(),
        table_oid: Some(table_oid),
        domain_oid: None,
        index_oid: Some(index_oid),
        column_numbers: Some(conkey),
        expression: None,
        on_update: None,
        on_delete: None,
        match_type: None,
        comment: None,
    }
}

pub fn fk_row(
    oid: Oid,
    table_oid: Oid,
    name: &str,
    referenced_index_oid: Oid,
    conkey: Vec<i16>,
    on_delete: &str,
) -> ConstraintRow {
    ConstraintRow {
        oid,
        kind: "f".to_string(),
        name: name.to_string(),
        table_oid: Some(table_oid),
        domain_oid: None,
        index_oid: Some(referenced_index_oid),
        column_numbers: Some(conkey),
        expression: None,
        on_update: Some("a".to_string()),
        on_delete: Some(on_delete.to_string()),
        match_type: Some("s".to_string()),
        comment: None,
    }
}

pub fn sample_snapshot() -> Snapshot {
    sample_snapshot_with(Options::default())
}

pub fn sample_snapshot_with(options: Options) -> Snapshot {
    let schemas = vec![schema_row(PUBLIC, "public")];
    let system_schemas = vec![schema_row(PG_CATALOG, "pg_catalog")];

    let types = vec![
        base_type_row(T_BOOL, "bool"),
        base_type_row(T_INT4, "int4"),
        base_type_row(T_NUMERIC, "numeric"),
        base_type_row(T_TEXT, "text"),
        base_type_row(T_VARCHAR, "varchar"),
        // public."account" row type, backed by the table
        TypeRow {
            oid: T_ACCOUNT_ROW,
            class_oid: Some(ACCOUNT),
            schema_oid: PUBLIC,
            name: "account".to_string(),
            kind: "c".to_string(),
            sql_type: None,
            values: None,
            relation_kind: Some("r".to_string()),
            comment: None,
        },
        // standalone composite
        TypeRow {
            oid: T_ADDRESS,
            class_oid: Some(C_ADDRESS),
            schema_oid: PUBLIC,
            name: "address".to_string(),
            kind: "c".to_string(),
            sql_type: None,
            values: None,
            relation_kind: Some("c".to_string()),
            comment: None,
        },
        TypeRow {
            oid: T_ORDER_STATUS,
            class_oid: None,
            schema_oid: PUBLIC,
            name: "order_status".to_string(),
            kind: "e".to_string(),
            sql_type: None,
            values: Some(vec![
                "pending".to_string(),
                "shipped".to_string(),
                "delivered".to_string(),
            ]),
            relation_kind: None,
            comment: None,
        },
        TypeRow {
            oid: T_PRICE,
            class_oid: None,
            schema_oid: PUBLIC,
            name: "price".to_string(),
            kind: "d".to_string(),
            sql_type: Some("numeric(10,2)".to_string()),
            values: None,
            relation_kind: None,
            comment: None,
        },
    ];

    let mut account = entity_row(ACCOUNT, "r", "account");
    account.comment = Some("Customer accounts. pg-structure {\"hidden\": false}".to_string());
    let mut account_emails = entity_row(ACCOUNT_EMAILS, "v", "account_emails");
    account_emails.definition = Some("SELECT account.email FROM account;".to_string());
    let mut order_totals = entity_row(ORDER_TOTALS, "m", "order_totals");
    order_totals.definition =
        Some("SELECT o.account_id, sum(o.amount) AS total FROM \"order\" o GROUP BY 1;".to_string());

    let entities = vec![
        account,
        account_emails,
        entity_row(ACCOUNT_ID_SEQ, "S", "account_id_seq"),
        entity_row(CART, "r", "cart"),
        entity_row(CART_PRODUCT, "r", "cart_product"),
        entity_row(CONTACT, "r", "contact"),
        entity_row(FRIENDSHIP, "r", "friendship"),
        entity_row(ORDER, "r", "order"),
        order_totals,
        entity_row(PERSON, "r", "person"),
        entity_row(PRODUCT, "r", "product"),
    ];

    let columns = vec![
        // account
        {
            let mut c = column_row(ACCOUNT, "r", "id", 1, T_INT4);
            c.not_null = true;
            c.identity = Some("a".to_string());
            c
        },
        {
            let mut c = column_row(ACCOUNT, "r", "email", 2, T_VARCHAR);
            c.not_null = true;
            c.type_modifier = 68; // varchar(64)
            c
        },
        column_row(ACCOUNT, "r", "balance", 3, T_PRICE),
        column_row(ACCOUNT, "r", "status", 4, T_ORDER_STATUS),
        {
            let mut c = column_row(ACCOUNT, "r", "tags", 5, T_TEXT);
            c.array_dimension = 1;
            c
        },
        // account_emails view
        {
            let mut c = column_row(ACCOUNT_EMAILS, "v", "email", 1, T_VARCHAR);
            c.type_modifier = 68;
            c
        },
        // address composite
        {
            let mut c = column_row(C_ADDRESS, "c", "street", 1, T_VARCHAR);
            c.type_modifier = 104; // varchar(100)
            c
        },
        column_row(C_ADDRESS, "c", "city", 2, T_TEXT),
        // cart
        {
            let mut c = column_row(CART, "r", "id", 1, T_INT4);
            c.not_null = true;
            c
        },
        // cart_product
        {
            let mut c = column_row(CART_PRODUCT, "r", "cart_id", 1, T_INT4);
            c.not_null = true;
            c
        },
        {
            let mut c = column_row(CART_PRODUCT, "r", "product_id", 2, T_INT4);
            c.not_null = true;
            c
        },
        // contact
        {
            let mut c = column_row(CONTACT, "r", "id", 1, T_INT4);
            c.not_null = true;
            c
        },
        {
            let mut c = column_row(CONTACT, "r", "account_id", 2, T_INT4);
            c.not_null = true;
            c
        },
        // friendship
        {
            let mut c = column_row(FRIENDSHIP, "r", "person_a", 1, T_INT4);
            c.not_null = true;
            c
        },
        {
            let mut c = column_row(FRIENDSHIP, "r", "person_b", 2, T_INT4);
            c.not_null = true;
            c
        },
        // order
        {
            let mut c = column_row(ORDER, "r", "id", 1, T_INT4);
            c.not_null = true;
            c
        },
        {
            let mut c = column_row(ORDER, "r", "account_id", 2, T_INT4);
            c.not_null = true;
            c
        },
        column_row(ORDER, "r", "amount", 3, T_NUMERIC),
        // order_totals materialized view
        column_row(ORDER_TOTALS, "m", "account_id", 1, T_INT4),
        column_row(ORDER_TOTALS, "m", "total", 2, T_NUMERIC),
        // person
        {
            let mut c = column_row(PERSON, "r", "id", 1, T_INT4);
            c.not_null = true;
            c
        },
        // product
        {
            let mut c = column_row(PRODUCT, "r", "id", 1, T_INT4);
            c.not_null = true;
            c
        },
    ];

    let indexes = vec![
        {
            let mut i = index_row(IX_ACCOUNT_PKEY, ACCOUNT, "account_pkey", vec![1]);
            i.is_unique = true;
            i.is_primary = true;
            i
        },
        {
            let mut i = index_row(IX_ACCOUNT_EMAIL_KEY, ACCOUNT, "account_email_key", vec![2]);
            i.is_unique = true;
            i
        },
        {
            let mut i =
                index_row(IX_ACCOUNT_EMAIL_LOWER, ACCOUNT, "account_email_lower_idx", vec![0]);
            i.expressions = vec!["lower((email)::text)".to_string()];
            i
        },
        {
            let mut i = index_row(IX_CART_PKEY, CART, "cart_pkey", vec![1]);
            i.is_unique = true;
            i.is_primary = true;
            i
        },
        {
            let mut i =
                index_row(IX_CART_PRODUCT_PKEY, CART_PRODUCT, "cart_product_pkey", vec![1, 2]);
            i.is_unique = true;
            i.is_primary = true;
            i
        },
        {
            let mut i = index_row(IX_CONTACT_PKEY, CONTACT, "contact_pkey", vec![1]);
            i.is_unique = true;
            i.is_primary = true;
            i
        },
        {
            let mut i = index_row(IX_FRIENDSHIP_PKEY, FRIENDSHIP, "friendship_pkey", vec![1, 2]);
            i.is_unique = true;
            i.is_primary = true;
            i
        },
        {
            let mut i = index_row(IX_ORDER_PKEY, ORDER, "order_pkey", vec![1]);
            i.is_unique = true;
            i.is_primary = true;
            i
        },
        index_row(IX_ORDER_TOTALS_ACCOUNT, ORDER_TOTALS, "order_totals_account_idx", vec![1]),
        {
            let mut i = index_row(IX_PERSON_PKEY, PERSON, "person_pkey", vec![1]);
            i.is_unique = true;
            i.is_primary = true;
            i
        },
        {
            let mut i = index_row(IX_PRODUCT_PKEY, PRODUCT, "product_pkey", vec![1]);
            i.is_unique = true;
            i.is_primary = true;
            i
        },
    ];

    let constraints = vec![
        // domain constraints sort first (conrelid 0)
        ConstraintRow {
            oid: Oid(18000),
            kind: "c".to_string(),
            name: "price_check".to_string(),
            table_oid: None,
            domain_oid: Some(T_PRICE),
            index_oid: None,
            column_numbers: None,
            expression: Some("VALUE >= 0::numeric".to_string()),
            on_update: None,
            on_delete: None,
            match_type: None,
            comment: None,
        },
        ConstraintRow {
            oid: Oid(18001),
            kind: "c".to_string(),
            name: "account_email_check".to_string(),
            table_oid: Some(ACCOUNT),
            domain_oid: None,
            index_oid: None,
            column_numbers: Some(vec![2]),
            expression: Some("length(email::text) > 3".to_string()),
            on_update: None,
            on_delete: None,
            match_type: None,
            comment: None,
        },
        {
            let mut c = pk_row(Oid(18002), ACCOUNT, "account_email_key", IX_ACCOUNT_EMAIL_KEY, vec![2]);
            c.kind = "u".to_string();
            c
        },
        pk_row(Oid(18003), ACCOUNT, "account_pkey", IX_ACCOUNT_PKEY, vec![1]),
        pk_row(Oid(18004), CONTACT, "contact_pkey", IX_CONTACT_PKEY, vec![1]),
        fk_row(Oid(18005), CONTACT, "contacts,account", IX_ACCOUNT_PKEY, vec![2], "c"),
        fk_row(Oid(18006), ORDER, "order_account_fkey", IX_ACCOUNT_PKEY, vec![2], "c"),
        pk_row(Oid(18007), ORDER, "order_pkey", IX_ORDER_PKEY, vec![1]),
        pk_row(Oid(18008), CART, "cart_pkey", IX_CART_PKEY, vec![1]),
        pk_row(Oid(18009), PRODUCT, "product_pkey", IX_PRODUCT_PKEY, vec![1]),
        fk_row(Oid(18010), CART_PRODUCT, "cart_product_cart_fkey", IX_CART_PKEY, vec![1], "c"),
        pk_row(Oid(18011), CART_PRODUCT, "cart_product_pkey", IX_CART_PRODUCT_PKEY, vec![1, 2]),
        fk_row(
            Oid(18012),
            CART_PRODUCT,
            "cart_product_product_fkey",
            IX_PRODUCT_PKEY,
            vec![2],
            "c",
        ),
        pk_row(Oid(18013), PERSON, "person_pkey", IX_PERSON_PKEY, vec![1]),
        fk_row(Oid(18014), FRIENDSHIP, "friendship_a_fkey", IX_PERSON_PKEY, vec![1], "c"),
        fk_row(Oid(18015), FRIENDSHIP, "friendship_b_fkey", IX_PERSON_PKEY, vec![2], "c"),
        pk_row(Oid(18016), FRIENDSHIP, "friendship_pkey", IX_FRIENDSHIP_PKEY, vec![1, 2]),
    ];

    let functions = vec![
        FunctionRow {
            oid: Oid(9502),
            schema_oid: PUBLIC,
            kind: "p".to_string(),
            name: "archive_orders".to_string(),
            identity_arguments: "integer".to_string(),
            argument_types: Some(vec!["integer".to_string()]),
            argument_names: Some(vec!["keep_days".to_string()]),
            argument_modes: None,
            return_type: "void".to_string(),
            returns_set: false,
            language: "sql".to_string(),
            volatility: "v".to_string(),
            is_strict: false,
            comment: None,
        },
        FunctionRow {
            oid: Oid(9503),
            schema_oid: PUBLIC,
            kind: "a".to_string(),
            name: "median".to_string(),
            identity_arguments: "numeric".to_string(),
            argument_types: Some(vec!["numeric".to_string()]),
            argument_names: None,
            argument_modes: None,
            return_type: "numeric".to_string(),
            returns_set: false,
            language: "internal".to_string(),
            volatility: "i".to_string(),
            is_strict: false,
            comment: None,
        },
        FunctionRow {
            oid: Oid(9501),
            schema_oid: PUBLIC,
            kind: "f".to_string(),
            name: "update_updated_at".to_string(),
            identity_arguments: String::new(),
            argument_types: Some(Vec::new()),
            argument_names: None,
            argument_modes: None,
            return_type: "trigger".to_string(),
            returns_set: false,
            language: "plpgsql".to_string(),
            volatility: "v".to_string(),
            is_strict: false,
            comment: None,
        },
    ];

    let triggers = vec![TriggerRow {
        oid: Oid(9601),
        table_oid: ACCOUNT,
        function_oid: Oid(9501),
        name: "account_updated".to_string(),
        // BEFORE UPDATE, FOR EACH ROW
        type_flags: 1 | 2 | 16,
        definition: "CREATE TRIGGER account_updated BEFORE UPDATE ON public.account \
                     FOR EACH ROW EXECUTE FUNCTION update_updated_at()"
            .to_string(),
        comment: None,
    }];

    Snapshot {
        name: "shop".to_string(),
        server_version: 140005,
        config: options,
        query_results: QueryResults {
            schemas,
            system_schemas,
            types,
            entities,
            columns,
            indexes,
            constraints,
            functions,
            triggers,
        },
    }
}

pub fn sample_db() -> Db {
    Db::from_snapshot(sample_snapshot()).expect("sample snapshot must assemble")
}

pub fn empty_snapshot() -> Snapshot {
    Snapshot {
        name: "empty".to_string(),
        server_version: 140005,
        config: Options::default(),
        query_results: QueryResults {
            schemas: Vec::new(),
            system_schemas: vec![schema_row(PG_CATALOG, "pg_catalog")],
            types: vec![base_type_row(T_INT4, "int4")],
            entities: Vec::new(),
            columns: Vec::new(),
            indexes: Vec::new(),
            constraints: Vec::new(),
            functions: Vec::new(),
            triggers: Vec::new(),
        },
    }
}
