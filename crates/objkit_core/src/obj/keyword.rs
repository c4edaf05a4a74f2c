//! Directive keywords recognised by the OBJ and MTL parsers.

/// OBJ geometry directives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjKeyword {
    /// `v x y z [r g b]`
    Vertex,

    /// `vt u v [w]`
    TexCoord,

    /// `vn x y z`
    Normal,

    /// `f v1 v2 v3 ...`
    Face,

    /// `g name...`
    Group,

    /// `o name`
    Object,

    /// `usemtl name`
    UseMaterial,

    /// `mtllib file`
    MaterialLibrary,

    /// `s group|off` (ignored)
    Smoothing,
}

impl ObjKeyword {
    /// Look up a directive. Returns `None` for anything unsupported.
    pub fn parse(keyword: &str) -> Option<Self> {
        match keyword {
            "v" => Some(Self::Vertex),
            "vt" => Some(Self::TexCoord),
            "vn" => Some(Self::Normal),
            "f" => Some(Self::Face),
            "g" => Some(Self::Group),
            "o" => Some(Self::Object),
            "usemtl" => Some(Self::UseMaterial),
            "mtllib" => Some(Self::MaterialLibrary),
            "s" => Some(Self::Smoothing),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vertex => "v",
            Self::TexCoord => "vt",
            Self::Normal => "vn",
            Self::Face => "f",
            Self::Group => "g",
            Self::Object => "o",
            Self::UseMaterial => "usemtl",
            Self::MaterialLibrary => "mtllib",
            Self::Smoothing => "s",
        }
    }
}

/// MTL material directives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MtlKeyword {
    NewMaterial,
    Shininess,
    Ambient,
    Diffuse,
    Specular,
    Emissive,
    OpticalDensity,
    Opacity,
    Illumination,
    DiffuseMap,
}

impl MtlKeyword {
    /// Look up a directive. Keywords are case sensitive (`Kd`, not `kd`).
    pub fn parse(keyword: &str) -> Option<Self> {
        match keyword {
            "newmtl" => Some(Self::NewMaterial),
            "Ns" => Some(Self::Shininess),
            "Ka" => Some(Self::Ambient),
            "Kd" => Some(Self::Diffuse),
            "Ks" => Some(Self::Specular),
            "Ke" => Some(Self::Emissive),
            "Ni" => Some(Self::OpticalDensity),
            "d" => Some(Self::Opacity),
            "illum" => Some(Self::Illumination),
            "map_Kd" => Some(Self::DiffuseMap),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewMaterial => "newmtl",
            Self::Shininess => "Ns",
            Self::Ambient => "Ka",
            Self::Diffuse => "Kd",
            Self::Specular => "Ks",
            Self::Emissive => "Ke",
            Self::OpticalDensity => "Ni",
            Self::Opacity => "d",
            Self::Illumination => "illum",
            Self::DiffuseMap => "map_Kd",
        }
    }
}
