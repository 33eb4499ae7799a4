#![allow(missing_docs, clippy::indexing_slicing)]
use hec::{
    CoeffModulus, Context, EncryptionParameters, EncryptionParametersBuilder, PlainModulus,
    SchemeType, SecurityLevel,
};
use std::error::Error;
use std::sync::Arc;

fn batching_parameters(degree: usize) -> Result<EncryptionParameters, Box<dyn Error>> {
    Ok(EncryptionParametersBuilder::new(SchemeType::Bfv)
        .set_poly_modulus_degree(degree)
        .set_coeff_modulus(&CoeffModulus::bfv_default(degree, SecurityLevel::Tc128)?)
        .set_plain_modulus(PlainModulus::batching(degree, 20)?)
        .build()?)
}

#[test]
fn bfv_context_end_to_end() -> Result<(), Box<dyn Error>> {
    let parms = batching_parameters(8192)?;
    let levels = parms.coeff_modulus().len();
    let context = Context::new_arc(parms, true, SecurityLevel::Tc128)?;

    let key = context.key_context_data();
    assert!(key.qualifiers().parameters_set());
    assert!(key.qualifiers().using_ntt);
    assert!(key.qualifiers().using_batching);
    assert!(key.qualifiers().using_keyswitching);
    assert!(key.qualifiers().using_descending_modulus_chain);
    assert_eq!(key.qualifiers().security_level, SecurityLevel::Tc128);

    // Walk the chain down from the first data level and back up, checking
    // that the id index and the links agree.
    assert_eq!(context.chain_length(), levels);
    let mut id = *context.first_parms_id();
    let mut visited = 1;
    while let Some(next) = context.next_context_data(&id)? {
        assert_eq!(
            context.prev_context_data(next.parms_id())?.map(|d| *d.parms_id()),
            Some(id)
        );
        id = *next.parms_id();
        visited += 1;
    }
    assert_eq!(visited, levels - 1);
    assert_eq!(&id, context.last_parms_id());
    assert!(context.get_context_data(&id)?.is_last());

    // The total modulus shrinks by exactly the dropped prime at each step.
    for data in context.iter() {
        if let Some(parent) = context.prev_context_data(data.parms_id())? {
            let dropped = parent.total_coeff_modulus() / data.total_coeff_modulus();
            assert!(parent
                .parms()
                .coeff_modulus()
                .iter()
                .any(|q| dropped == q.value().into()));
        }
    }
    Ok(())
}

#[test]
fn ckks_context_has_no_plain_modulus() -> Result<(), Box<dyn Error>> {
    let parms = EncryptionParametersBuilder::new(SchemeType::Ckks)
        .set_poly_modulus_degree(8192)
        .set_coeff_modulus_sizes(&[60, 60, 60, 60])
        .build()?;
    assert!(parms.plain_modulus().is_none());

    let context = Context::new(parms, true, SecurityLevel::None)?;
    assert_eq!(context.chain_length(), 4);
    assert!(context.key_context_data().qualifiers().using_batching);
    // Four 60-bit primes exceed the 8192/tc128 bound of 218 bits.
    assert_eq!(
        context.key_context_data().qualifiers().security_level,
        SecurityLevel::None
    );
    Ok(())
}

#[test]
fn context_is_shareable() -> Result<(), Box<dyn Error>> {
    let context = Context::new_arc(batching_parameters(4096)?, true, SecurityLevel::Tc128)?;
    let clone = Arc::clone(&context);
    let handle = std::thread::spawn(move || *clone.first_parms_id());
    assert_eq!(&handle.join().unwrap(), context.first_parms_id());
    Ok(())
}

#[test]
fn defaults_build_at_their_own_security_level() -> Result<(), Box<dyn Error>> {
    for sec_level in [
        SecurityLevel::Tc128,
        SecurityLevel::Tc192,
        SecurityLevel::Tc256,
    ] {
        let parms = EncryptionParametersBuilder::new(SchemeType::Bgv)
            .set_poly_modulus_degree(8192)
            .set_coeff_modulus(&CoeffModulus::bfv_default(8192, sec_level)?)
            .set_plain_modulus(PlainModulus::batching(8192, 20)?)
            .build()?;
        let context = Context::new(parms, true, sec_level)?;
        assert!(context.key_context_data().qualifiers().security_level >= sec_level);
    }
    Ok(())
}
