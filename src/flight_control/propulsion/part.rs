use strum_macros::{Display, EnumIter, EnumString};

/// Resources the simulation tracks on parts, named exactly as the simulation reports them.
#[derive(
    Debug,
    Display,
    EnumString,
    EnumIter,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum ResourceKind {
    ElectricCharge,
    LiquidFuel,
    Oxidizer,
    IntakeAir,
    SolidFuel,
    MonoPropellant,
    XenonGas,
    Ore,
    Ablator,
}

impl ResourceKind {
    /// Mass of one resource unit in kilograms.
    pub fn density(self) -> f64 {
        match self {
            ResourceKind::LiquidFuel | ResourceKind::Oxidizer => 5.0,
            ResourceKind::SolidFuel => 7.5,
            ResourceKind::MonoPropellant => 4.0,
            ResourceKind::XenonGas => 0.1,
            ResourceKind::Ore => 10.0,
            ResourceKind::Ablator => 1.0,
            ResourceKind::ElectricCharge | ResourceKind::IntakeAir => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResourceAmount {
    kind: ResourceKind,
    amount: f64,
}

impl ResourceAmount {
    pub fn new(kind: ResourceKind, amount: f64) -> Self { Self { kind, amount } }
    pub fn kind(&self) -> ResourceKind { self.kind }
    pub fn amount(&self) -> f64 { self.amount }
    pub fn mass(&self) -> f64 { self.amount * self.kind.density() }
}

/// Engine data of a part as reported by telemetry.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EngineInfo {
    /// Thrust at full throttle under current conditions (N).
    available_thrust: f64,
    max_vacuum_thrust: f64,
    /// Vacuum specific impulse (s).
    vacuum_isp: f64,
}

impl EngineInfo {
    pub fn new(available_thrust: f64, max_vacuum_thrust: f64, vacuum_isp: f64) -> Self {
        Self { available_thrust, max_vacuum_thrust, vacuum_isp }
    }

    pub fn available_thrust(&self) -> f64 { self.available_thrust }
    pub fn max_vacuum_thrust(&self) -> f64 { self.max_vacuum_thrust }
    pub fn vacuum_isp(&self) -> f64 { self.vacuum_isp }

    /// Thrust-per-Isp flow term at throttle `throttle`, zero for engines without Isp.
    pub fn mass_flow(&self, throttle: f64) -> f64 {
        if self.vacuum_isp > 0.0 { self.max_vacuum_thrust * throttle / self.vacuum_isp } else { 0.0 }
    }
}

/// A single vehicle part, grouped by the stage at which it is decoupled.
///
/// `decouple_stage == -1` marks parts that are never decoupled (the payload).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PartInfo {
    name: String,
    decouple_stage: i32,
    /// Wet mass (kg).
    mass: f64,
    dry_mass: f64,
    engine: Option<EngineInfo>,
    resources: Vec<ResourceAmount>,
}

impl PartInfo {
    pub fn new(name: impl Into<String>, decouple_stage: i32, mass: f64, dry_mass: f64) -> Self {
        Self {
            name: name.into(),
            decouple_stage,
            mass,
            dry_mass,
            engine: None,
            resources: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_engine(mut self, engine: EngineInfo) -> Self {
        self.engine = Some(engine);
        self
    }

    #[must_use]
    pub fn with_resource(mut self, kind: ResourceKind, amount: f64) -> Self {
        self.resources.push(ResourceAmount::new(kind, amount));
        self
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn decouple_stage(&self) -> i32 { self.decouple_stage }
    pub fn mass(&self) -> f64 { self.mass }
    pub fn dry_mass(&self) -> f64 { self.dry_mass }
    pub fn engine(&self) -> Option<&EngineInfo> { self.engine.as_ref() }
    pub fn resources(&self) -> &[ResourceAmount] { &self.resources }

    /// Units of `kind` held by this part.
    pub fn amount_of(&self, kind: ResourceKind) -> f64 {
        self.resources.iter().filter(|r| r.kind() == kind).map(ResourceAmount::amount).sum()
    }
}
