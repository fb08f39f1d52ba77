use bunkerdesk_core::AppResult;
use bunkerdesk_domain::{FieldDefinition, FieldType, ResourceDescriptor, SequenceNumbering};

/// Builds the refinery and marine-bunkering resource catalog.
///
/// Every resource served by the API is declared here; the generic facade
/// derives validation, numbering, uniqueness and reference population from
/// these descriptors.
pub fn bunkering_catalog() -> AppResult<Vec<ResourceDescriptor>> {
    Ok(vec![
        tanques()?,
        bombas()?,
        bunkers()?,
        chequeos_calidad()?,
        contratos()?,
        costos()?,
        inventarios()?,
        operadores()?,
        contactos()?,
    ])
}

fn tanques() -> AppResult<ResourceDescriptor> {
    ResourceDescriptor::new(
        "tanques",
        "Tanques",
        vec![
            FieldDefinition::new("nombre", "Nombre", FieldType::Text, true, true)?,
            FieldDefinition::new("producto", "Producto", FieldType::Text, true, false)?,
            FieldDefinition::new(
                "capacidadBarriles",
                "Capacidad (barriles)",
                FieldType::Number,
                true,
                false,
            )?,
            FieldDefinition::new("activo", "Activo", FieldType::Boolean, false, false)?,
        ],
        None,
    )
}

fn bombas() -> AppResult<ResourceDescriptor> {
    ResourceDescriptor::new(
        "bombas",
        "Bombas",
        vec![
            FieldDefinition::new("nombre", "Nombre", FieldType::Text, true, true)?,
            FieldDefinition::reference(
                "tanque",
                "Tanque",
                true,
                "tanques",
                vec!["nombre".to_owned(), "producto".to_owned()],
            )?,
            FieldDefinition::new(
                "caudalGpm",
                "Caudal (gpm)",
                FieldType::Number,
                false,
                false,
            )?,
            FieldDefinition::new("estado", "Estado", FieldType::Text, false, false)?,
        ],
        None,
    )
}

fn bunkers() -> AppResult<ResourceDescriptor> {
    ResourceDescriptor::new(
        "bunkers",
        "Bunkers",
        vec![
            FieldDefinition::new("nombre", "Nombre", FieldType::Text, true, true)?,
            FieldDefinition::new(
                "capacidadBarriles",
                "Capacidad (barriles)",
                FieldType::Number,
                true,
                false,
            )?,
            FieldDefinition::new("bandera", "Bandera", FieldType::Text, false, false)?,
        ],
        None,
    )
}

fn chequeos_calidad() -> AppResult<ResourceDescriptor> {
    ResourceDescriptor::new(
        "chequeosCalidad",
        "Chequeos de calidad",
        vec![
            FieldDefinition::reference(
                "bunker",
                "Bunker",
                true,
                "bunkers",
                vec!["nombre".to_owned()],
            )?,
            FieldDefinition::new("producto", "Producto", FieldType::Text, true, false)?,
            FieldDefinition::new("fecha", "Fecha", FieldType::Date, true, false)?,
            FieldDefinition::new("resultados", "Resultados", FieldType::Json, false, false)?,
            FieldDefinition::new("aprobado", "Aprobado", FieldType::Boolean, false, false)?,
        ],
        // One numbering run per bunker.
        Some(SequenceNumbering::new(
            "numeroChequeoCalidad",
            Some("bunker".to_owned()),
        )?),
    )
}

fn contratos() -> AppResult<ResourceDescriptor> {
    ResourceDescriptor::new(
        "contratos",
        "Contratos",
        vec![
            FieldDefinition::reference(
                "cliente",
                "Cliente",
                true,
                "contactos",
                vec!["nombre".to_owned(), "correo".to_owned()],
            )?,
            FieldDefinition::new("producto", "Producto", FieldType::Text, true, false)?,
            FieldDefinition::new(
                "volumenBarriles",
                "Volumen (barriles)",
                FieldType::Number,
                true,
                false,
            )?,
            FieldDefinition::new("fechaInicio", "Fecha de inicio", FieldType::Date, true, false)?,
            FieldDefinition::new("fechaFin", "Fecha de fin", FieldType::Date, false, false)?,
        ],
        Some(SequenceNumbering::new("numeroContrato", None)?),
    )
}

fn costos() -> AppResult<ResourceDescriptor> {
    ResourceDescriptor::new(
        "costos",
        "Costos",
        vec![
            FieldDefinition::reference(
                "contrato",
                "Contrato",
                true,
                "contratos",
                vec!["numeroContrato".to_owned(), "producto".to_owned()],
            )?,
            FieldDefinition::new("concepto", "Concepto", FieldType::Text, true, false)?,
            FieldDefinition::new("montoUsd", "Monto (USD)", FieldType::Number, true, false)?,
            FieldDefinition::new("fecha", "Fecha", FieldType::Date, true, false)?,
        ],
        None,
    )
}

fn inventarios() -> AppResult<ResourceDescriptor> {
    ResourceDescriptor::new(
        "inventarios",
        "Inventarios",
        vec![
            FieldDefinition::reference(
                "tanque",
                "Tanque",
                true,
                "tanques",
                vec!["nombre".to_owned(), "producto".to_owned()],
            )?,
            FieldDefinition::new("fecha", "Fecha", FieldType::Date, true, false)?,
            FieldDefinition::new(
                "volumenBarriles",
                "Volumen (barriles)",
                FieldType::Number,
                true,
                false,
            )?,
            FieldDefinition::new(
                "temperaturaCelsius",
                "Temperatura (°C)",
                FieldType::Number,
                false,
                false,
            )?,
        ],
        None,
    )
}

fn operadores() -> AppResult<ResourceDescriptor> {
    ResourceDescriptor::new(
        "operadores",
        "Operadores",
        vec![
            FieldDefinition::new("nombre", "Nombre", FieldType::Text, true, false)?,
            FieldDefinition::new("cedula", "Cédula", FieldType::Text, true, true)?,
            FieldDefinition::new("turno", "Turno", FieldType::Text, false, false)?,
        ],
        None,
    )
}

fn contactos() -> AppResult<ResourceDescriptor> {
    ResourceDescriptor::new(
        "contactos",
        "Contactos",
        vec![
            FieldDefinition::new("nombre", "Nombre", FieldType::Text, true, false)?,
            FieldDefinition::new("correo", "Correo", FieldType::Text, true, true)?,
            FieldDefinition::new("telefono", "Teléfono", FieldType::Text, false, false)?,
            FieldDefinition::new("empresa", "Empresa", FieldType::Text, false, false)?,
        ],
        None,
    )
}
