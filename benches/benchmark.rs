use benchmark_simple::*;
use jwk_simple::prelude::*;

const EC_JWK: &str = r#"{
    "kty": "EC",
    "crv": "P-256",
    "x": "MKBCTNIcKUSDii11ySs3526iDZ8AiTo7Tu6KPAqv7D4",
    "y": "4Etl6SRW2YiLUrN5vfvVHuhp7x8PxltmWWlbbM4IFyM",
    "use": "enc",
    "kid": "1"
}"#;

const RSA_JWK: &str = r#"{
    "kty": "RSA",
    "n": "0vx7agoebGcQSuuPiLJXZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAtVT86zwu1RK7aPFFxuhDR1L6tSoc_BJECPebWKRXjBZCiFV4n3oknjhMstn64tZ_2W-5JsGY4Hc5n9yBXArwl93lqt7_RN5w6Cf0h4QyQ5v-65YGjQR0_FDW2QvzqY368QQMicAtaSqzs8KJZgnYb9c7d0zgdAZHzu6qMQvRL5hajrn1n91CbOpbISD08qNLyrdkt-bFTWhAI4vMQFh6WeZu0fM4lFd2NcRwr3XPksINHaQ-G_xBniIqbw0Ls1jF44-csFCur-kEgU8awapJzKnqDKgw",
    "e": "AQAB",
    "alg": "RS256",
    "kid": "2011-04-29"
}"#;

fn main() {
    let bench = Bench::new();

    let options = &Options {
        iterations: 1000,
        warmup_iterations: 100,
        min_samples: 5,
        max_samples: 10,
        max_rsd: 1.0,
        ..Default::default()
    };

    let res = bench.run(options, || Jwk::from_json(RSA_JWK).unwrap());
    println!("rsa - parse: {}", res.throughput(1));

    let jwk = Jwk::from_json(RSA_JWK).unwrap();
    let res = bench.run(options, || {
        jwk.resolve(Some(KeyOperation::Verify), &ResolveOptions::default())
            .unwrap()
    });
    println!("rsa - resolve public key: {}", res.throughput(1));

    let jwk = Jwk::from_json(EC_JWK).unwrap();
    let res = bench.run(options, || {
        jwk.resolve(Some(KeyOperation::Encrypt), &ResolveOptions::default())
            .unwrap()
    });
    println!("p256 - resolve public key: {}", res.throughput(1));

    let mut set = JwkSet::new();
    set.insert(Jwk::from_json(RSA_JWK).unwrap());
    set.insert(Jwk::from_json(EC_JWK).unwrap());
    let exported = set.export().unwrap();
    let res = bench.run(options, || JwkSet::from_json(&exported).unwrap());
    println!("jwk set - import: {}", res.throughput(1));
}
