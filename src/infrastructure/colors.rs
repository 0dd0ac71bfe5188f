use serenity::all::Colour;

pub fn slate() -> Colour {
    Colour::new(0x64748b)
}

pub fn amber() -> Colour {
    Colour::new(0xf59e0b)
}

pub fn emerald() -> Colour {
    Colour::new(0x10b981)
}
