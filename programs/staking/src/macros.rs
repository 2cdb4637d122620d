#[macro_export]
/// This macro will emit the provided custom program error and log where the error happened,
/// if the condition is not met.
macro_rules! check {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            let error_code: $crate::errors::StakingError = $err;
            #[cfg(not(feature = "test-bpf"))]
            anchor_lang::prelude::msg!(
                "Error \"{}\" thrown at {}:{}",
                error_code,
                file!(),
                line!()
            );
            return Err(error_code.into());
        }
    };

    ($cond:expr, $err:expr, $($arg:tt)*) => {
        if !($cond) {
            let error_code: $crate::errors::StakingError = $err;
            #[cfg(not(feature = "test-bpf"))]
            anchor_lang::prelude::msg!(
                "Error \"{}\" thrown at {}:{}",
                error_code,
                file!(),
                line!()
            );
            #[cfg(not(feature = "test-bpf"))]
            anchor_lang::prelude::msg!($($arg)*);
            return Err(error_code.into());
        }
    };
}

/// Builds the `ok_or_else` closure for a checked arithmetic step. Defaults to
/// `ArithmeticOverflow`; pass `ArithmeticUnderflow` for subtractions.
#[macro_export]
macro_rules! math_error {
    () => {
        $crate::math_error!(ArithmeticOverflow)
    };

    ($kind:ident) => {{
        || {
            let error_code = $crate::errors::StakingError::$kind;
            anchor_lang::prelude::msg!(
                "Error \"{}\" thrown at {}:{}",
                error_code,
                file!(),
                line!()
            );
            error_code
        }
    }};
}

#[macro_export]
macro_rules! set_if_some {
    ($attr: expr, $val: expr) => {
        if let Some(val) = $val {
            anchor_lang::prelude::msg!("Setting {} to {:?}", stringify!($attr), val);
            $attr = val.into()
        }
    };
}

#[macro_export]
macro_rules! custody_seed {
    ($pool_pk: expr) => {
        &[$crate::constants::POOL_CUSTODY_SEED.as_bytes(), &$pool_pk.to_bytes()] as &[&[u8]]
    };
}

#[macro_export]
macro_rules! custody_authority_seed {
    ($pool_pk: expr) => {
        &[
            $crate::constants::POOL_CUSTODY_AUTHORITY_SEED.as_bytes(),
            &$pool_pk.to_bytes(),
        ] as &[&[u8]]
    };
}

/// Signer seeds for transfers out of custody.
#[macro_export]
macro_rules! custody_authority_signer {
    ($pool_pk: expr, $authority_bump: expr) => {
        &[&[
            $crate::constants::POOL_CUSTODY_AUTHORITY_SEED.as_bytes(),
            &$pool_pk.to_bytes(),
            &[$authority_bump],
        ]]
    };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "debug")]
        {
            anchor_lang::prelude::msg!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! assert_struct_size {
    ($struct: ty, $size: expr) => {
        static_assertions::const_assert_eq!(<$struct as anchor_lang::Space>::INIT_SPACE, $size);
    };
}
